use super::fragment::ConfigFragment;
use super::live::LiveConfig;

/// Which fields of the live configuration changed value during a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub name: bool,
    pub size: bool,
    pub window_mode: bool,
}

impl MergeReport {
    pub fn any(&self) -> bool {
        self.name || self.size || self.window_mode
    }
}

/// Overwrite each field of `live` the fragment specifies.
///
/// Fields are handled independently. Unspecified fields, including an
/// `Unknown` window mode, leave the live value alone, so a partial file can
/// never blank or zero the configuration. Merging the same fragment twice has
/// the same effect as merging it once.
pub fn merge_fragment(live: &mut LiveConfig, fragment: &ConfigFragment) -> MergeReport {
    let mut report = MergeReport::default();

    if let Some(name) = &fragment.display_name {
        if live.display_name != *name {
            live.display_name.clone_from(name);
            report.name = true;
        }
    }

    if let Some(width) = fragment.width {
        report.size |= live.width != width;
        live.width = width;
    }
    if let Some(height) = fragment.height {
        report.size |= live.height != height;
        live.height = height;
    }

    if let Some(mode) = fragment.window_mode.filter(|m| m.is_known()) {
        report.window_mode = live.window_mode != mode;
        live.window_mode = mode;
    }

    report
}
