//! Reversible renaming used to switch server plugins on and off.
//!
//! A plugin is disabled by appending [`DISABLED_SUFFIX`] to its `.jar` name and
//! re-enabled by cutting the name back to end right after the first `.jar`.
//! Because the cut uses the *first* occurrence, a disabled
//! `core.jar.bak.jar.disabled` re-enables to `core.jar`, not `core.jar.bak.jar`.

use crate::types::FileEntity;

pub const PLUGIN_EXTENSION: &str = ".jar";
pub const DISABLED_SUFFIX: &str = ".disabled";

/// Directory name fragments that mark a plugin folder
const PLUGIN_DIRECTORIES: &[&str] = &["plugins", "mods"];

/// Whether a plugin with this name is currently enabled
pub fn is_enabled(name: &str) -> bool {
    name.ends_with(PLUGIN_EXTENSION)
}

/// Name a currently enabled plugin gets when switched off
pub fn disable(name: &str) -> String {
    format!("{}{}", name, DISABLED_SUFFIX)
}

/// Name a currently disabled plugin gets when switched on
///
/// Returns `None` if the name has no `.jar` in it.
pub fn enable(name: &str) -> Option<String> {
    let idx = name.find(PLUGIN_EXTENSION)?;
    Some(name[..idx + PLUGIN_EXTENSION.len()].to_string())
}

/// Target name for flipping a plugin's state
///
/// Returns `None` when the name does not contain `.jar`.
pub fn toggled_name(name: &str) -> Option<String> {
    if is_enabled(name) {
        Some(disable(name))
    } else {
        enable(name)
    }
}

/// Whether the plugin switch is shown for this entity in this directory
///
/// The directory check is a plain substring match, so `/my-mods-backup`
/// qualifies as well.
pub fn is_toggle_applicable(entity: &FileEntity, directory: &str) -> bool {
    entity.is_file
        && entity.name.contains(PLUGIN_EXTENSION)
        && PLUGIN_DIRECTORIES.iter().any(|d| directory.contains(d))
}

/// Display label and enabled state of a plugin row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLabel<'a> {
    pub label: &'a str,
    pub enabled: bool,
}

pub fn plugin_label(name: &str) -> Option<PluginLabel<'_>> {
    let idx = name.find(PLUGIN_EXTENSION)?;
    Some(PluginLabel {
        label: &name[..idx + PLUGIN_EXTENSION.len()],
        enabled: is_enabled(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_off_appends_suffix() {
        assert_eq!(toggled_name("plugin.jar").as_deref(), Some("plugin.jar.disabled"));
        assert_eq!(
            toggled_name("Essentials-2.20.jar").as_deref(),
            Some("Essentials-2.20.jar.disabled")
        );
    }

    #[test]
    fn test_toggle_on_truncates_after_jar() {
        assert_eq!(toggled_name("plugin.jar.disabled").as_deref(), Some("plugin.jar"));
        assert_eq!(toggled_name("plugin.jar.old.disabled").as_deref(), Some("plugin.jar"));
        assert_eq!(toggled_name("plugin.jar.bak").as_deref(), Some("plugin.jar"));
    }

    #[test]
    fn test_no_jar_has_no_toggle() {
        assert_eq!(toggled_name("readme.txt"), None);
        assert_eq!(enable("config.yml"), None);
    }

    #[test]
    fn test_round_trip() {
        let names = [
            "plugin.jar",
            "a.jar",
            ".jar",
            "WorldEdit-7.2.15.jar",
            "my plugin (1).jar",
            "jarjar.jar",
            "ünïcode-plugin.jar",
        ];
        for name in names {
            let off = disable(name);
            assert_ne!(off, name);
            assert_eq!(enable(&off).as_deref(), Some(name), "round trip of {}", name);
            assert_eq!(toggled_name(&toggled_name(name).unwrap()).as_deref(), Some(name));
        }
    }

    #[test]
    fn test_first_match_truncation() {
        // The cut happens at the first `.jar`, dropping the rest of the name.
        assert_eq!(enable("core.jar.bak.jar.disabled").as_deref(), Some("core.jar"));
        assert_eq!(enable("lib.jarfile.disabled").as_deref(), Some("lib.jar"));
    }

    #[test]
    fn test_applicability_gate() {
        let jar = FileEntity::file("plugin.jar");
        assert!(is_toggle_applicable(&jar, "/plugins"));
        assert!(is_toggle_applicable(&jar, "/server/mods"));
        assert!(is_toggle_applicable(&jar, "/old-plugins-backup"));
        assert!(!is_toggle_applicable(&jar, "/"));
        assert!(!is_toggle_applicable(&jar, "/config"));

        let disabled = FileEntity::file("plugin.jar.disabled");
        assert!(is_toggle_applicable(&disabled, "/plugins"));

        let folder = FileEntity::directory("plugin.jar");
        assert!(!is_toggle_applicable(&folder, "/plugins"));

        let yml = FileEntity::file("config.yml");
        assert!(!is_toggle_applicable(&yml, "/plugins"));
    }

    #[test]
    fn test_plugin_label() {
        let label = plugin_label("plugin.jar.disabled").unwrap();
        assert_eq!(label.label, "plugin.jar");
        assert!(!label.enabled);

        let label = plugin_label("plugin.jar").unwrap();
        assert_eq!(label.label, "plugin.jar");
        assert!(label.enabled);

        assert!(plugin_label("notes.txt").is_none());
    }
}
