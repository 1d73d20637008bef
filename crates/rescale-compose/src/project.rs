//! Compose project selection flags.

use std::path::PathBuf;

/// Which compose project the backend talks to.
///
/// Empty fields fall back to docker compose's own discovery (compose file
/// in the working directory, project name from the directory name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeProject {
    /// `-f` files, in order.
    pub files: Vec<PathBuf>,
    /// `-p` project name.
    pub project_name: Option<String>,
    /// `--project-directory`.
    pub project_directory: Option<PathBuf>,
}

impl ComposeProject {
    /// Arguments that prefix every `docker compose` invocation.
    pub fn compose_args(&self) -> Vec<String> {
        let mut args = vec!["compose".to_string()];
        for file in &self.files {
            args.push("-f".to_string());
            args.push(file.display().to_string());
        }
        if let Some(name) = &self.project_name {
            args.push("-p".to_string());
            args.push(name.clone());
        }
        if let Some(dir) = &self.project_directory {
            args.push("--project-directory".to_string());
            args.push(dir.display().to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_project_is_bare_compose() {
        assert_eq!(ComposeProject::default().compose_args(), vec!["compose"]);
    }

    #[test]
    fn all_flags_in_order() {
        let project = ComposeProject {
            files: vec![PathBuf::from("base.yml"), PathBuf::from("prod.yml")],
            project_name: Some("shop".to_string()),
            project_directory: Some(PathBuf::from("/srv/shop")),
        };
        assert_eq!(
            project.compose_args(),
            vec![
                "compose",
                "-f",
                "base.yml",
                "-f",
                "prod.yml",
                "-p",
                "shop",
                "--project-directory",
                "/srv/shop",
            ]
        );
    }
}
