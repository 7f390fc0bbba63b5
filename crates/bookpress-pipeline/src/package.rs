//! Book package model
//!
//! A book package is the read-only input to a conversion job: ordered
//! chapters of HTML, book metadata, and an image set. Packages are loaded
//! from a directory containing a `book.json` manifest next to the chapter
//! files.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Reading direction of the book's script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Direction implied by an ISO-639 language code.
    pub fn for_language(lang: &str) -> Self {
        let code = lang.split(['-', '_']).next().unwrap_or(lang);
        match code {
            "ar" | "dv" | "fa" | "he" | "ps" | "ur" | "yi" => TextDirection::Rtl,
            _ => TextDirection::Ltr,
        }
    }

    pub fn html_attr(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMeta {
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Explicit direction wins; otherwise derived from the language.
    #[serde(default)]
    pub direction: Option<TextDirection>,
    #[serde(default)]
    pub license: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl BookMeta {
    pub fn direction(&self) -> TextDirection {
        self.direction
            .unwrap_or_else(|| TextDirection::for_language(&self.language))
    }
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub name: String,
    pub path: PathBuf,
}

/// Immutable input to the pipeline; owned by the caller.
#[derive(Debug, Clone)]
pub struct BookPackage {
    pub meta: BookMeta,
    pub chapters: Vec<Chapter>,
    pub images: Vec<ImageAsset>,
    /// Directory the package was loaded from; chapter-relative image
    /// references resolve against it at render time.
    pub root: Option<PathBuf>,
}

/// Manifest schema of `book.json`
#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(flatten)]
    meta: BookMeta,
    chapters: Vec<ManifestChapter>,
}

#[derive(Debug, Deserialize)]
struct ManifestChapter {
    id: String,
    title: String,
    file: PathBuf,
}

impl BookPackage {
    /// Load a package from a directory with a `book.json` manifest.
    ///
    /// Chapter files are resolved relative to the directory; images are
    /// collected from an optional `images/` subdirectory.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join("book.json");

        let bytes = tokio::fs::read(&manifest_path).await.map_err(|e| {
            PipelineError::Package {
                message: format!("cannot read {}: {e}", manifest_path.display()),
            }
        })?;
        let manifest: Manifest =
            serde_json::from_slice(&bytes).map_err(|e| PipelineError::Package {
                message: format!("malformed {}: {e}", manifest_path.display()),
            })?;

        if manifest.chapters.is_empty() {
            return Err(PipelineError::Package {
                message: "package has no chapters".to_string(),
            });
        }

        let mut chapters = Vec::with_capacity(manifest.chapters.len());
        for entry in manifest.chapters {
            let path = dir.join(&entry.file);
            let html =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| PipelineError::Package {
                        message: format!("cannot read chapter {}: {e}", path.display()),
                    })?;
            chapters.push(Chapter {
                id: entry.id,
                title: entry.title,
                html,
            });
        }

        let mut images = Vec::new();
        let image_dir = dir.join("images");
        if let Ok(mut entries) = tokio::fs::read_dir(&image_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                if path.is_file() {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    images.push(ImageAsset { name, path });
                }
            }
            images.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(BookPackage {
            meta: manifest.meta,
            chapters,
            images,
            root: Some(dir.to_path_buf()),
        })
    }

    /// Assemble the chapters into one body document for rendering.
    ///
    /// Chapter markup is emitted verbatim, in order, inside per-chapter
    /// sections; the renderer derives the bookmark outline from the
    /// heading tags the chapters already carry.
    pub fn body_html(&self) -> String {
        let dir = self.meta.direction().html_attr();
        let base = match &self.root {
            Some(root) => format!("<base href=\"file://{}/\">\n", root.display()),
            None => String::new(),
        };
        let mut html = format!(
            "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{dir}\">\n<head>\n<meta charset=\"utf-8\">\n{base}<title>{}</title>\n</head>\n<body>\n",
            html_escape(&self.meta.language),
            html_escape(&self.meta.title),
        );
        for chapter in &self.chapters {
            html.push_str(&format!(
                "<section class=\"chapter\" id=\"{}\">\n",
                html_escape(&chapter.id)
            ));
            html.push_str(&chapter.html);
            html.push_str("\n</section>\n");
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

/// Minimal HTML text escaping for generated markup
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
