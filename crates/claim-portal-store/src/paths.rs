use claim_portal_model::PortalPhase;
use std::path::PathBuf;

/// File layout under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn schedule(&self) -> PathBuf {
        self.root.join("schedule.json")
    }

    #[must_use]
    pub fn portal_config(&self) -> PathBuf {
        self.root.join("portal-config.json")
    }

    #[must_use]
    pub fn portal_state(&self) -> PathBuf {
        self.root.join("portal-state.json")
    }

    #[must_use]
    pub fn analytics(&self) -> PathBuf {
        self.root.join("analytics.json")
    }

    #[must_use]
    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    #[must_use]
    pub fn template(&self, phase: PortalPhase) -> PathBuf {
        self.templates_dir().join(phase.template_file_name())
    }

    #[must_use]
    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }

    #[must_use]
    pub fn holder_snapshot(&self, round_number: u64) -> PathBuf {
        self.snapshots_dir().join(format!("round-{round_number}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths_are_rooted_and_stable() {
        let layout = StoreLayout::new("/srv/claim");
        assert_eq!(layout.schedule(), PathBuf::from("/srv/claim/schedule.json"));
        assert_eq!(
            layout.template(PortalPhase::Live),
            PathBuf::from("/srv/claim/templates/live.json")
        );
        assert_eq!(
            layout.holder_snapshot(12),
            PathBuf::from("/srv/claim/snapshots/round-12.json")
        );
    }
}
