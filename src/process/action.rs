//! Install and uninstall actions.

use std::fmt;
use std::path::Path;

use crate::config::ActionsConfig;

/// An operation the HTTP surface can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Uninstall,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Uninstall => "uninstall",
        }
    }

    /// Argument vector for this action: launcher prefix, script, the config
    /// flag and the document path.
    pub fn argv(&self, actions: &ActionsConfig, document: &Path) -> Vec<String> {
        let script = match self {
            Action::Install => &actions.install_script,
            Action::Uninstall => &actions.uninstall_script,
        };
        actions
            .launcher
            .iter()
            .cloned()
            .chain([
                script.clone(),
                actions.config_flag.clone(),
                document.display().to_string(),
            ])
            .collect()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_argv() {
        let actions = ActionsConfig::default();
        let doc = Path::new("egs-installer-config.yaml");
        assert_eq!(
            Action::Install.argv(&actions, doc),
            vec!["./egs-installer.sh", "--input-yaml", "egs-installer-config.yaml"]
        );
        assert_eq!(
            Action::Uninstall.argv(&actions, doc),
            vec!["./egs-uninstall.sh", "--input-yaml", "egs-installer-config.yaml"]
        );
    }

    #[test]
    fn test_launcher_prefix() {
        let actions = ActionsConfig {
            launcher: vec!["bash".into(), "-e".into()],
            ..ActionsConfig::default()
        };
        let argv = Action::Install.argv(&actions, Path::new("/etc/egs.yaml"));
        assert_eq!(
            argv,
            vec!["bash", "-e", "./egs-installer.sh", "--input-yaml", "/etc/egs.yaml"]
        );
    }
}
