#[cfg(test)]
pub mod path_tests {
    use crate::interface::Errno;
    use crate::safewasi::filesystem::*;
    use crate::safewasi::resolver::*;
    use proptest::prelude::*;

    fn check_normalize(path: &str, expected: &str) {
        assert_eq!(normalize_path(path).unwrap(), expected, "normalizing {:?}", path);
    }

    // the real roots used here do not exist, so the component walk finds no links
    fn check(mapped: &str, real: &str, path: &str) -> Result<String, Errno> {
        let normalized = normalize_root_path(mapped).unwrap();
        let root = SandboxRoot {
            normalized_path: &normalized,
            real_path: real,
        };
        resolve_path(&root, path, 0)
    }

    fn pass(mapped: &str, real: &str, path: &str, expected: &str) {
        assert_eq!(check(mapped, real, path).as_deref(), Ok(expected), "resolving {:?} under {:?}", path, mapped);
    }

    fn fail(mapped: &str, real: &str, path: &str, expected: Errno) {
        assert_eq!(check(mapped, real, path), Err(expected), "resolving {:?} under {:?}", path, mapped);
    }

    fn check_absolute(mapped: &str, real: &str, path: &str) -> Result<String, Errno> {
        let normalized = normalize_root_path(mapped).unwrap();
        let root = SandboxRoot {
            normalized_path: &normalized,
            real_path: real,
        };
        let virtual_path = crate::safewasi::resolver::normalize_absolute_path(&root, path)?;
        resolve_path_to_host(&root, &virtual_path)
    }

    #[test]
    pub fn ut_wasi_normalize_relative() {
        check_normalize("", ".");
        check_normalize(".", ".");
        check_normalize("./.", ".");
        check_normalize("./..", "..");
        check_normalize("..", "..");
        check_normalize("../.", "..");
        check_normalize("../..", "../..");
        check_normalize("./foo", "foo");
        check_normalize("./foo/../bar", "bar");
        check_normalize("./foo/..bar", "foo/..bar");
        check_normalize("./foo/////bar", "foo/bar");
        check_normalize("./foo/bar/baz/../../../..", "..");
        check_normalize("./foo/bar/baz/../../../../..", "../..");
        check_normalize("../../../test_path", "../../../test_path");
        check_normalize("./././test_path", "test_path");
        check_normalize("foo/...", "foo/...");
    }

    #[test]
    pub fn ut_wasi_normalize_absolute() {
        check_normalize("/", "/");
        check_normalize("//", "/");
        check_normalize("/foo/./bar", "/foo/bar");
        check_normalize("/foo/baz/../bar", "/foo/bar");
        check_normalize("/foo/../bar", "/bar");
        check_normalize("/../bar", "/bar");
        check_normalize("/../../../bar", "/bar");
        check_normalize("/../../../", "/");
        check_normalize("////..//../..///", "/");
        check_normalize("/foo/..", "/");
    }

    #[test]
    pub fn ut_wasi_normalize_keeps_trailing_slash() {
        check_normalize("./", "./");
        check_normalize(".//", "./");
        check_normalize("./../", "../");
        check_normalize("../", "../");
        check_normalize("..//", "../");
        check_normalize("./foo//", "foo/");
        check_normalize("/../../../bar/", "/bar/");
        check_normalize("./foo/bar/baz/../../../../", "../");
        check_normalize("./foo/bar/baz/../../../../../", "../../");
    }

    #[test]
    pub fn ut_wasi_normalize_limit() {
        assert_eq!(normalize_path_with_limit("./foo", 4), Err(Errno::ENOBUFS));
        assert_eq!(normalize_path_with_limit("./foo", 5).unwrap(), "foo");
    }

    #[test]
    pub fn ut_wasi_normalize_root_path() {
        assert_eq!(normalize_root_path("/var/").unwrap(), "/var");
        assert_eq!(normalize_root_path("./").unwrap(), ".");
        assert_eq!(normalize_root_path("/").unwrap(), "/");
        assert_eq!(normalize_root_path("../baz/").unwrap(), "../baz");
    }

    #[test]
    pub fn ut_wasi_combine_paths() {
        assert_eq!(combine_paths("/bar", "test_path").unwrap(), "/bar/test_path");
        assert_eq!(combine_paths(".", "").unwrap(), "./");
    }

    #[test]
    pub fn ut_wasi_sandboxed_absolute_root() {
        assert!(is_path_sandboxed("/bar/test_path", "/bar"));
        assert!(is_path_sandboxed("/bar", "/bar"));
        assert!(!is_path_sandboxed("/test_path", "/bar"));
        //plain prefix match, the mapping still lands under the real root
        assert!(is_path_sandboxed("/barx/test_path", "/bar"));
    }

    #[test]
    pub fn ut_wasi_sandboxed_dot_root() {
        assert!(is_path_sandboxed("test_path", "."));
        assert!(is_path_sandboxed("..test_path", "."));
        assert!(is_path_sandboxed(".", "./"));
        assert!(!is_path_sandboxed("..", "."));
        assert!(!is_path_sandboxed("../test_path", "./"));
    }

    #[test]
    pub fn ut_wasi_sandboxed_relative_root() {
        assert!(is_path_sandboxed("foo/test_path", "foo"));
        assert!(is_path_sandboxed("foo", "foo"));
        assert!(is_path_sandboxed("../baz/test_path", "../baz"));
        assert!(is_path_sandboxed("../test_path", ".."));
        assert!(!is_path_sandboxed("abc/test_path", "foo"));
        assert!(!is_path_sandboxed("../../test_path", ".."));
        assert!(!is_path_sandboxed("../foo/test_path", "foo"));
    }

    #[test]
    pub fn ut_wasi_resolve_pass() {
        pass("/", "/foo", "test_path", "/foo/test_path");
        pass("/bar", "/baz", "test_path", "/baz/test_path");
        pass("/bar", "/baz", "./test_path", "/baz/test_path");
        pass("/bar", "/baz", "../bar/test_path", "/baz/test_path");
        pass("/bar", "/baz", "../bar/./test_path/../test_path", "/baz/test_path");
        pass(".", "/foo", "test_path", "/foo/test_path");
        pass("./", "/foo", "test_path", "/foo/test_path");
        pass(".", "/foo", "./test_path", "/foo/test_path");
        pass("./", "/foo", "./test_path", "/foo/test_path");
        pass(".", "/foo", "bar/../test_path", "/foo/test_path");
        pass("foo", "/baz", "../foo/test_path", "/baz/test_path");
        pass("..", "/foo", "test_path", "/foo/test_path");
        pass("../baz", "/foo", "test_path", "/foo/test_path");
        pass("../baz", "/foo", "./test_path", "/foo/test_path");
        pass("../baz", "/foo", "../baz/test_path", "/foo/test_path");
    }

    #[test]
    pub fn ut_wasi_resolve_root_itself() {
        pass("/bar", "/baz", "", "/baz");
        pass("/bar", "/baz", ".", "/baz");
        pass("/", "/foo", ".", "/foo");
        pass("/bar", "/baz", "dir/", "/baz/dir/");
    }

    #[test]
    pub fn ut_wasi_resolve_fail() {
        fail("/bar", "/baz", "/test_path", Errno::ENOTCAPABLE);
        fail("/bar", "/baz", "/bar/../test_path", Errno::ENOTCAPABLE);
        fail("/bar", "/baz", "../test_path", Errno::ENOTCAPABLE);
        fail(".", "/baz", "bar/../../test_path", Errno::ENOTCAPABLE);
        fail("..", "/baz", "../../test_path", Errno::ENOTCAPABLE);
        fail("foo", "/baz", "../abc/test_path", Errno::ENOTCAPABLE);
        fail("foo", "/baz", "../../foo/test_path", Errno::ENOTCAPABLE);
        fail("../baz", "/foo", "../bak/test_path", Errno::ENOTCAPABLE);
    }

    #[test]
    pub fn ut_wasi_resolve_malformed() {
        fail("/bar", "/baz", "file.txt\0", Errno::EINVAL);
        fail("/bar", "/baz", "a\0/../b", Errno::EINVAL);
    }

    #[test]
    pub fn ut_wasi_absolute_candidates() {
        assert_eq!(check_absolute("/", "/foo", "/test_path").unwrap(), "/foo/test_path");
        assert_eq!(check_absolute("/bar", "/baz", "/bar/test_path").unwrap(), "/baz/test_path");
        assert_eq!(check_absolute("/bar", "/baz", "/bar/../bar/test_path").unwrap(), "/baz/test_path");
        assert_eq!(check_absolute("/bar", "/baz", "/test_path"), Err(Errno::ENOTCAPABLE));
        assert_eq!(check_absolute("/bar", "/baz", "/bar/../test_path"), Err(Errno::ENOTCAPABLE));
        //an absolute path cannot be placed under a relative root
        assert_eq!(check_absolute(".", "/baz", "/test_path"), Err(Errno::ENOTCAPABLE));
    }

    #[test]
    pub fn ut_wasi_symlink_target_check() {
        let root = SandboxRoot {
            normalized_path: "/sandbox",
            real_path: "/real",
        };
        assert_eq!(verify_symlink_target(&root, "link", "file"), Ok(()));
        assert_eq!(verify_symlink_target(&root, "dir/link", "../file"), Ok(()));
        assert_eq!(verify_symlink_target(&root, "./invalid_symlink.txt", "../secret"), Err(Errno::ENOTCAPABLE));
        assert_eq!(verify_symlink_target(&root, "link", "/absolute"), Err(Errno::EPERM));
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just(".".to_string()),
            Just("..".to_string()),
            "[a-z.]{1,3}",
        ]
    }

    fn guest_path() -> impl Strategy<Value = String> {
        (any::<bool>(), prop::collection::vec(segment(), 0..8)).prop_map(|(absolute, segments)| {
            let joined = segments.join("/");
            if absolute {
                format!("/{}", joined)
            } else {
                joined
            }
        })
    }

    fn sandbox_roots() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("/sb"), Just("/"), Just("."), Just("sb"), Just("../sb"), Just("..")]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn prop_normalize_is_idempotent(path in guest_path()) {
            let once = normalize_path(&path).unwrap();
            prop_assert_eq!(normalize_path(&once).unwrap(), once);
        }

        #[test]
        fn prop_normalize_keeps_absoluteness(path in guest_path()) {
            let normalized = normalize_path(&path).unwrap();
            prop_assert_eq!(is_absolute_path(&normalized), is_absolute_path(&path));
        }

        #[test]
        fn prop_normalize_leaves_only_leading_dotdot(path in guest_path()) {
            let normalized = normalize_path(&path).unwrap();
            if normalized != "." && normalized != "./" {
                let mut seen_name = false;
                for seg in normalized.split('/').filter(|s| !s.is_empty()) {
                    prop_assert_ne!(seg, ".");
                    if seg == ".." {
                        prop_assert!(!seen_name, "{:?} has '..' after a name", normalized);
                    } else {
                        seen_name = true;
                    }
                }
            }
        }

        #[test]
        fn prop_resolve_stays_under_real_root(mapped in sandbox_roots(), path in guest_path()) {
            match check(mapped, "/real", &path) {
                Ok(resolved) => {
                    prop_assert!(resolved == "/real" || resolved.starts_with("/real/"), "{:?}", resolved);
                    prop_assert!(!resolved.split('/').any(|seg| seg == ".."), "{:?}", resolved);
                }
                Err(e) => prop_assert_eq!(e, Errno::ENOTCAPABLE),
            }
        }
    }
}
