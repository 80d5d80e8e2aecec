use serde::{Deserialize, Serialize};

use crate::content::{FieldKind, Post, Schema, SideProject};

/// Environment variables consulted, in order, when no branch is configured.
const BRANCH_VARS: &[&str] = &["GITHUB_BRANCH", "VERCEL_GIT_COMMIT_REF", "HEAD"];
const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
    pub branch: Option<String>,
    pub client_id: Option<String>,
    pub token: Option<String>,
    pub output_folder: String,
    pub media_root: String,
}

impl Default for CmsSettings {
    fn default() -> Self {
        Self {
            branch: None,
            client_id: None,
            token: None,
            output_folder: "admin".to_string(),
            media_root: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsConfig {
    pub branch: String,
    pub client_id: Option<String>,
    pub token: Option<String>,
    pub build: BuildConfig,
    pub media: MediaConfig,
    pub schema: SchemaConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub output_folder: String,
    pub public_folder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaConfig {
    pub tina: MediaStore,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStore {
    pub media_root: String,
    pub public_folder: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaConfig {
    pub collections: Vec<CmsCollection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmsCollection {
    pub name: &'static str,
    pub label: &'static str,
    pub path: String,
    pub format: &'static str,
    pub fields: Vec<CmsField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsField {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "is_false")]
    pub is_title: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_body: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CmsConfig {
    pub fn build(settings: &CmsSettings, content_root: &str, public_folder: &str) -> Self {
        Self::build_with_env(settings, content_root, public_folder, |name| {
            std::env::var(name).ok()
        })
    }

    pub fn build_with_env<F>(
        settings: &CmsSettings,
        content_root: &str,
        public_folder: &str,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            branch: resolve_branch(settings.branch.as_deref(), env),
            client_id: settings.client_id.clone(),
            token: settings.token.clone(),
            build: BuildConfig {
                output_folder: settings.output_folder.clone(),
                public_folder: public_folder.to_string(),
            },
            media: MediaConfig {
                tina: MediaStore {
                    media_root: settings.media_root.clone(),
                    public_folder: public_folder.to_string(),
                },
            },
            schema: SchemaConfig {
                collections: vec![
                    collection::<Post>(content_root),
                    collection::<SideProject>(content_root),
                ],
            },
        }
    }
}

pub fn resolve_branch<F>(configured: Option<&str>, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    configured
        .filter(|branch| !branch.is_empty())
        .map(str::to_string)
        .or_else(|| {
            BRANCH_VARS
                .iter()
                .find_map(|var| env(var).filter(|branch| !branch.is_empty()))
        })
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
}

fn collection<T: Schema>(content_root: &str) -> CmsCollection {
    let spec = T::SPEC;
    let mut fields: Vec<CmsField> = spec
        .fields
        .iter()
        .map(|field| CmsField {
            kind: field.kind.as_str(),
            name: field.name,
            label: field.label,
            is_title: field.is_title,
            required: field.required,
            is_body: false,
        })
        .collect();

    fields.push(CmsField {
        kind: FieldKind::RichText.as_str(),
        name: "body",
        label: "Body",
        is_title: false,
        required: false,
        is_body: true,
    });

    CmsCollection {
        name: spec.cms_name,
        label: spec.label,
        path: format!("{}/{}", content_root.trim_end_matches('/'), spec.name),
        format: "mdx",
        fields,
    }
}
