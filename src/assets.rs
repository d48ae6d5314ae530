//! Output Writer - flat image tree plus Xcode imageset bundles
//!
//! Every successful generation writes two artifacts: a PNG under the
//! per-category tree, and an imageset directory holding the same PNG next
//! to a Contents.json manifest. The manifest shape is what Xcode's asset
//! catalog expects and must not drift.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct AssetContents {
    images: Vec<AssetImage>,
    info: AssetInfo,
    properties: AssetProperties,
}

#[derive(Debug, Serialize)]
struct AssetImage {
    filename: String,
    idiom: &'static str,
    scale: &'static str,
}

#[derive(Debug, Serialize)]
struct AssetInfo {
    author: &'static str,
    version: u32,
}

#[derive(Debug, Serialize)]
struct AssetProperties {
    #[serde(rename = "template-rendering-intent")]
    template_rendering_intent: &'static str,
}

/// Filesystem-safe identifier: lower-cased, everything outside
/// `[a-zA-Z0-9_-]` replaced with `_`.
pub fn sanitize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes generated images to both destination layouts.
pub struct OutputWriter {
    images_dir: PathBuf,
    assets_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(images_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Write the image to the flat tree and the imageset bundle, returning
    /// the flat-tree path. Both artifacts are written on every call.
    pub fn write(&self, image: &[u8], word: &str, category: &str) -> Result<PathBuf> {
        let safe_word = sanitize(word);
        let filename = format!("{safe_word}.png");

        let category_dir = self.images_dir.join(sanitize(category));
        std::fs::create_dir_all(&category_dir)
            .with_context(|| format!("failed to create {}", category_dir.display()))?;
        let image_path = category_dir.join(&filename);
        std::fs::write(&image_path, image)
            .with_context(|| format!("failed to write {}", image_path.display()))?;

        let imageset_dir = self.assets_dir.join(format!("{safe_word}.imageset"));
        std::fs::create_dir_all(&imageset_dir)
            .with_context(|| format!("failed to create {}", imageset_dir.display()))?;
        std::fs::write(imageset_dir.join(&filename), image)
            .with_context(|| format!("failed to write image into {}", imageset_dir.display()))?;

        let contents = AssetContents {
            images: vec![AssetImage {
                filename,
                idiom: "universal",
                scale: "1x",
            }],
            info: AssetInfo {
                author: "xcode",
                version: 1,
            },
            properties: AssetProperties {
                template_rendering_intent: "original",
            },
        };
        let manifest_path = imageset_dir.join("Contents.json");
        std::fs::write(&manifest_path, serde_json::to_string_pretty(&contents)?)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;

        Ok(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_and_lowercases() {
        assert_eq!(sanitize("ice cream!"), "ice_cream_");
        assert_eq!(sanitize("Animals & Creatures"), "animals___creatures");
        assert_eq!(sanitize("well-behaved_word"), "well-behaved_word");
        assert_eq!(sanitize("CAT"), "cat");
    }

    #[test]
    fn write_produces_both_artifacts() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path().join("images"), temp.path().join("assets"));

        let flat = writer.write(b"png-bytes", "ice cream!", "Food & Drink").unwrap();

        assert_eq!(
            flat,
            temp.path().join("images/food___drink/ice_cream_.png")
        );
        assert_eq!(std::fs::read(&flat).unwrap(), b"png-bytes");

        let bundle = temp.path().join("assets/ice_cream_.imageset");
        assert_eq!(
            std::fs::read(bundle.join("ice_cream_.png")).unwrap(),
            b"png-bytes"
        );
        assert!(bundle.join("Contents.json").exists());
    }

    #[test]
    fn manifest_shape_is_exact() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path().join("images"), temp.path().join("assets"));
        writer.write(b"x", "cat", "Animals & Creatures").unwrap();

        let manifest: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(
                temp.path().join("assets/cat.imageset/Contents.json"),
            )
            .unwrap(),
        )
        .unwrap();

        let expected = serde_json::json!({
            "images": [
                { "filename": "cat.png", "idiom": "universal", "scale": "1x" }
            ],
            "info": { "author": "xcode", "version": 1 },
            "properties": { "template-rendering-intent": "original" }
        });
        assert_eq!(manifest, expected);
    }

    #[test]
    fn rewrite_overwrites_cleanly() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path().join("images"), temp.path().join("assets"));

        writer.write(b"first", "cat", "Animals & Creatures").unwrap();
        let flat = writer.write(b"second", "cat", "Animals & Creatures").unwrap();

        assert_eq!(std::fs::read(flat).unwrap(), b"second");
    }
}
