//! Locations of the imagery and video shown by the checkpoints.
//!
//! Every field has a built-in default; a TOML file may override any subset.

use crate::interaction::Interaction;
use crate::proposal::{ProposalFlow, ProposalPhase};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to read asset table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("bad asset table: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assets {
    pub celebration: String,
    pub rose: String,
    pub teddy_video: String,
    pub promise_photo: String,
    pub hugs: [String; 4],
    pub kiss_idle: String,
    pub kiss_active: String,
    /// File name offered when saving a captured crown photo.
    pub snapshot_file_name: String,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            celebration: "https://media.tenor.com/DbfwouTfspoAAAAM/tripulaciones-de-terry.gif".into(),
            rose: "https://media1.tenor.com/m/5W3O1UxUHcIAAAAC/cat-holding-a-rose-hand-emoji-charles-scarlet-wing.gif"
                .into(),
            teddy_video: "https://www.youtube.com/embed/mCkT9Cxb-k4".into(),
            promise_photo: "/promise-day.jpg".into(),
            hugs: [
                "https://www.shutterstock.com/image-vector/typography-slogan-bear-doll-couple-600nw-2279971169.jpg".into(),
                "https://i.pinimg.com/736x/67/60/34/676034d2557c0a622c66498a9d41fe97.jpg".into(),
                "https://i.pinimg.com/736x/f4/ed/53/f4ed53aee2ff97e8830a0fa0a64005b0.jpg".into(),
                "https://i.pinimg.com/736x/69/a1/43/69a143941513d3548cef632af5b504d3.jpg".into(),
            ],
            kiss_idle: "/kiss-day-1.jpg".into(),
            kiss_active: "/kiss-day-2.jpg".into(),
            snapshot_file_name: "valentine-day.png".into(),
        }
    }
}

impl Assets {
    pub fn from_toml(src: &str) -> Result<Self, AssetError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let src = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let assets = Self::from_toml(&src)?;
        tracing::info!(path = %path.display(), "loaded asset table");
        Ok(assets)
    }

    /// Media currently shown by an open checkpoint, in display order.
    pub fn media_for(&self, interaction: &Interaction) -> Vec<&str> {
        match interaction {
            Interaction::Rose(_) => vec![self.rose.as_str()],
            Interaction::Teddy => vec![self.teddy_video.as_str()],
            Interaction::Promise => vec![self.promise_photo.as_str()],
            Interaction::Hugs(hugs) => match self.hugs.get(hugs.step()) {
                Some(image) => vec![image.as_str()],
                None => self.hugs.iter().map(String::as_str).collect(),
            },
            Interaction::Kiss(kiss) if kiss.is_active() => vec![self.kiss_active.as_str()],
            Interaction::Kiss(_) => vec![self.kiss_idle.as_str()],
            Interaction::Quiz(_) | Interaction::Chocolate(_) | Interaction::Crown(_) => Vec::new(),
        }
    }

    /// The celebration shown once the proposal is accepted.
    pub fn celebration_for(&self, flow: &ProposalFlow) -> Option<&str> {
        (flow.phase() == ProposalPhase::Accepted).then_some(self.celebration.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let assets = Assets::from_toml(
            r#"
            promise_photo = "/srv/photos/us.jpg"
            snapshot_file_name = "crown.png"
            "#,
        )
        .unwrap();
        assert_eq!(assets.promise_photo, "/srv/photos/us.jpg");
        assert_eq!(assets.snapshot_file_name, "crown.png");
        assert_eq!(assets.kiss_idle, Assets::default().kiss_idle);
        assert_eq!(assets.hugs, Assets::default().hugs);
    }

    #[test]
    fn test_empty_table_is_default() {
        assert_eq!(Assets::from_toml("").unwrap(), Assets::default());
    }

    #[test]
    fn test_media_follows_interaction_state() {
        use crate::interaction::{HugCarousel, KissToggle};

        let assets = Assets::default();
        let mut hugs = HugCarousel::new();
        assert_eq!(assets.media_for(&Interaction::Hugs(hugs)), vec![assets.hugs[0].as_str()]);
        for _ in 0..4 {
            hugs.next();
        }
        assert_eq!(assets.media_for(&Interaction::Hugs(hugs)).len(), 4);

        let mut kiss = KissToggle::new();
        assert_eq!(assets.media_for(&Interaction::Kiss(kiss)), vec!["/kiss-day-1.jpg"]);
        kiss.activate();
        assert_eq!(assets.media_for(&Interaction::Kiss(kiss)), vec!["/kiss-day-2.jpg"]);

        assert!(assets.media_for(&Interaction::Teddy)[0].contains("youtube"));
    }

    #[test]
    fn test_bad_table_is_an_error() {
        assert!(Assets::from_toml("hugs = 3").is_err());
    }
}
