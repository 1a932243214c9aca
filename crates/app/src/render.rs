use mercury_scm_core::domain::{Commit, Provider};
use mercury_scm_core::ScmFramework;
use std::fmt::Write;
use std::path::Path;

/// Text view of every provider's visible groups and the aggregate count
pub fn render_status(framework: &ScmFramework) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source Control ({})", framework.count());

    for provider in framework.providers() {
        render_provider(&mut out, provider);
    }
    out
}

fn render_provider(out: &mut String, provider: &Provider) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} [{}]", provider.label(), provider.count());

    let input = provider.input_box();
    if !input.value().is_empty() {
        let _ = writeln!(out, "  message: {}", input.value());
    }
    if let Some(validation) = input.validate() {
        let _ = writeln!(out, "  {:?}: {}", validation.severity, validation.message);
    }

    let mut any = false;
    for group in provider.visible_groups() {
        any = true;
        let _ = writeln!(out, "  {} ({})", group.label(), group.len());
        for state in group.resource_states() {
            let letter = state.status.map(|s| s.letter()).unwrap_or(' ');
            let shown = display_path(provider.root_path(), state.uri.as_str());
            let _ = writeln!(out, "    {} {}", letter, shown);
        }
    }
    if !any {
        let _ = writeln!(out, "  No changes");
    }
}

/// Resource path relative to the provider root when it lies below it
fn display_path(root: Option<&Path>, uri: &str) -> String {
    let path = Path::new(uri);
    root.and_then(|root| path.strip_prefix(root).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// One line per commit: short id, timestamp, author and subject
pub fn render_log(commits: &[Commit]) -> String {
    if commits.is_empty() {
        return "No commits yet\n".to_string();
    }

    let mut out = String::new();
    for commit in commits {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            commit.id.short(),
            commit.timestamp,
            commit.author.name,
            commit.message
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercury_scm_core::domain::{
        Author, CommitId, ResourceState, Timestamp, CHANGES_GROUP, STAGED_GROUP,
    };
    use std::path::PathBuf;

    #[test]
    fn test_render_status_lists_visible_groups_with_relative_paths() {
        let mut scm = ScmFramework::new();
        scm.create_provider("repo", "repo", Some(PathBuf::from("/work/repo")))
            .unwrap();
        scm.ensure_default_groups("repo").unwrap();
        scm.add_resource(
            "repo",
            CHANGES_GROUP,
            ResourceState::new("/work/repo/src/lib.rs")
                .with_status(mercury_scm_core::domain::FileStatus::Modified),
        )
        .unwrap();

        let text = render_status(&scm);

        assert!(text.starts_with("Source Control (1)\n"));
        assert!(text.contains("repo [1]"));
        assert!(text.contains("  Staged Changes (0)"));
        assert!(text.contains("  Changes (1)"));
        assert!(text.contains(&format!("    M {}", Path::new("src/lib.rs").display())));
        assert!(!text.contains("Merge Changes"));
        assert!(!text.contains("Untracked Changes"));
    }

    #[test]
    fn test_render_status_without_visible_groups() {
        let mut scm = ScmFramework::new();
        scm.create_provider("repo", "repo", None).unwrap();
        scm.create_group("repo", STAGED_GROUP, "Staged Changes").unwrap();
        scm.set_hide_when_empty("repo", STAGED_GROUP, true).unwrap();

        let text = render_status(&scm);
        assert!(text.contains("  No changes"));
    }

    #[test]
    fn test_render_log() {
        assert_eq!(render_log(&[]), "No commits yet\n");

        let commits = vec![Commit {
            id: CommitId("0123456789abcdef".to_string()),
            author: Author {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            message: "Initial commit".to_string(),
            timestamp: Timestamp::new(0, 0),
        }];
        let text = render_log(&commits);
        assert!(text.starts_with("01234567 "));
        assert!(text.trim_end().ends_with("Ada Initial commit"));
    }
}
