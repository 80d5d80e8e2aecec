use std::sync::{Arc, Mutex};

use crate::error::SceneError;
use crate::scene::{self, Scene, SceneConfig};
use crate::theme::{PreferenceStore, RootClasses, ThemeBus};

/// Everything that lives for one page session: the theme bus and the scene
/// subscribed to it.
pub struct Page<P> {
    pub theme: ThemeBus<RootClasses, P>,
    scene: Arc<Mutex<Scene>>,
}

impl<P: PreferenceStore> Page<P> {
    /// Restores the stored theme, builds the scene in that theme and wires
    /// the scene to theme changes.
    pub fn open(store: P, config: &SceneConfig) -> Result<Self, SceneError> {
        let mut theme = ThemeBus::restore(RootClasses::default(), store);
        let scene = Arc::new(Mutex::new(Scene::from_config(config, theme.current())?));
        scene::attach(&scene, &mut theme);

        Ok(Self { theme, scene })
    }

    pub fn scene(&self) -> &Arc<Mutex<Scene>> {
        &self.scene
    }
}
