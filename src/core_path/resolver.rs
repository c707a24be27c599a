use crate::constants::NOBODY_UID;

/// Turns a client-supplied path into a normalized absolute path.
///
/// The walk is purely lexical. No filesystem lookups happen here; callers
/// stat the result afterward and map errors to protocol responses.
///
/// Rules, in order: a missing or empty parameter means the working
/// directory, as does a leading dash (clients pass `ls`-style flags with
/// LIST). A leading `~` is home-relative. An absolute path walks from the
/// root, anything else from the working directory. `.` and empty components
/// are skipped and `..` pops one component, with popping past the root a
/// no-op.
pub fn resolve(current_dir: &str, home_dir: &str, path: Option<&str>) -> String {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => return current_dir.to_string(),
    };
    if path.starts_with('-') {
        return current_dir.to_string();
    }

    let (start, rest) = if let Some(stripped) = path.strip_prefix('~') {
        (home_dir, stripped)
    } else if path.starts_with('/') {
        ("/", path)
    } else {
        (current_dir, path)
    };

    let mut components: Vec<&str> = Vec::new();
    for component in start.split('/').chain(rest.split('/')) {
        match component {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    if components.is_empty() {
        String::from("/")
    } else {
        format!("/{}", components.join("/"))
    }
}

/// Advisory write-access policy for mutating commands.
///
/// Root and the root group may write anywhere, the anonymous placeholder
/// identity nowhere, and everyone else only inside their home directory.
/// This is path-prefix scoping on the resolved path, not a kernel-enforced
/// sandbox.
pub fn has_write_access(uid: u32, gid: u32, path: &str, home_dir: &str) -> bool {
    if uid == 0 || gid == 0 {
        return true;
    }
    if uid == NOBODY_UID {
        return false;
    }
    let home = home_dir.trim_end_matches('/');
    path == home || path.starts_with(&format!("{}/", home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_walk_from_the_working_directory() {
        assert_eq!(resolve("/home/bob", "/home/bob", Some("docs")), "/home/bob/docs");
        assert_eq!(resolve("/home/bob", "/home/bob", Some("a/b/c")), "/home/bob/a/b/c");
    }

    #[test]
    fn absolute_paths_ignore_the_working_directory() {
        assert_eq!(resolve("/home/bob", "/home/bob", Some("/etc/motd")), "/etc/motd");
    }

    #[test]
    fn dotdot_pops_one_component() {
        assert_eq!(resolve("/a/b", "/", Some("..")), "/a");
    }

    #[test]
    fn dotdot_at_root_is_a_noop() {
        assert_eq!(resolve("/", "/", Some("..")), "/");
        assert_eq!(resolve("/", "/", Some("../../..")), "/");
        assert_eq!(resolve("/a", "/", Some("../../../b")), "/b");
    }

    #[test]
    fn tilde_expands_to_home() {
        assert_eq!(resolve("/tmp", "/home/u", Some("~/x")), "/home/u/x");
        assert_eq!(resolve("/tmp", "/home/u", Some("~")), "/home/u");
    }

    #[test]
    fn missing_empty_and_flag_params_mean_cwd() {
        assert_eq!(resolve("/var/log", "/", None), "/var/log");
        assert_eq!(resolve("/var/log", "/", Some("")), "/var/log");
        assert_eq!(resolve("/var/log", "/", Some("-la")), "/var/log");
    }

    #[test]
    fn dot_and_empty_components_are_skipped() {
        assert_eq!(resolve("/a", "/", Some("./b//c/.")), "/a/b/c");
    }

    #[test]
    fn resolution_is_idempotent_once_absolute() {
        let first = resolve("/home/bob", "/home/bob", Some("../alice/./notes"));
        let second = resolve(&first, "/home/bob", Some(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn no_trailing_slash_except_root() {
        assert_eq!(resolve("/", "/", Some("a/")), "/a");
        assert_eq!(resolve("/", "/", Some("/")), "/");
    }

    #[test]
    fn root_and_root_group_write_anywhere() {
        assert!(has_write_access(0, 0, "/etc/x", "/home/u"));
        assert!(has_write_access(1000, 0, "/etc/x", "/home/u"));
    }

    #[test]
    fn nobody_writes_nowhere() {
        assert!(!has_write_access(NOBODY_UID, NOBODY_UID, "/home/u/x", "/home/u"));
    }

    #[test]
    fn ordinary_users_are_scoped_to_their_home() {
        assert!(has_write_access(1000, 1000, "/home/u/x", "/home/u"));
        assert!(has_write_access(1000, 1000, "/home/u", "/home/u"));
        assert!(!has_write_access(1000, 1000, "/etc/x", "/home/u"));
        // A sibling directory sharing the prefix string is not the home.
        assert!(!has_write_access(1000, 1000, "/home/uber/x", "/home/u"));
    }

    #[test]
    fn escape_via_dotdot_is_caught_after_resolution() {
        let resolved = resolve("/home/u", "/home/u", Some("../../etc/x"));
        assert_eq!(resolved, "/etc/x");
        assert!(!has_write_access(1000, 1000, &resolved, "/home/u"));
    }
}
