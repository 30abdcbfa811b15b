//! License banner rendering
//!
//! The banner template uses lodash-style placeholders so existing site
//! templates keep working: `<%= pkg.title %>`, `<%= pkg.version %>`,
//! `<%= year %>` and so on. Package fields come from `package.json`.

use std::path::Path;

use chrono::Datelike;
use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// The subset of `package.json` used in banners
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PackageMeta {
    pub name: String,
    pub title: String,
    pub version: String,
    pub homepage: String,
    #[serde(deserialize_with = "person_name")]
    pub author: String,
    pub license: String,
}

/// npm allows `author` as a string or as `{ "name": ..., "email": ... }`
fn person_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Person {
        Name(String),
        Object {
            #[serde(default)]
            name: String,
        },
    }

    Ok(match Person::deserialize(deserializer)? {
        Person::Name(name) | Person::Object { name } => name,
    })
}

impl PackageMeta {
    /// Read `package.json` from the project root.
    ///
    /// A missing file yields empty metadata; a malformed one is an error.
    pub fn load(project_root: &Path) -> PipelineResult<Self> {
        let path = project_root.join("package.json");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "no package.json, banner fields will be empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(PipelineError::file("failed to read", path, e)),
        };
        Self::parse(&path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> PipelineResult<Self> {
        serde_json::from_str(content).map_err(|e| PipelineError::InvalidPackage {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "title" => &self.title,
            "version" => &self.version,
            "homepage" => &self.homepage,
            "author" => &self.author,
            "license" => &self.license,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// A rendered banner, ready to prepend to generated files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner(String);

impl Banner {
    /// Render `template` for the given package and year
    pub fn render(template: &str, pkg: &PackageMeta, year: i32) -> PipelineResult<Self> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("<%=") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 3..];
            let Some(end) = after.find("%>") else {
                // unterminated tag, keep verbatim
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let key = after[..end].trim();
            if key == "year" {
                out.push_str(&year.to_string());
            } else {
                let value = key
                    .strip_prefix("pkg.")
                    .and_then(|field| pkg.field(field))
                    .ok_or_else(|| PipelineError::UnknownPlaceholder(key.to_string()))?;
                out.push_str(value);
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);

        Ok(Self(out))
    }

    /// Render `template` for the current calendar year
    pub fn for_today(template: &str, pkg: &PackageMeta) -> PipelineResult<Self> {
        Self::render(template, pkg, chrono::Local::now().year())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `banner + body`
    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(self.0.len() + body.len());
        out.push_str(&self.0);
        out.push_str(body);
        out
    }
}
