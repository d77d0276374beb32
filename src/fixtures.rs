#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::registry::Registry;
    use crate::value::Handle;

    /// Handles for the standard variable set declared by [`pair`].
    pub struct Vars {
        pub str: Handle<String>,
        pub int: Handle<i64>,
        pub float: Handle<f64>,
        pub bool: Handle<bool>,
        pub duration: Handle<Duration>,
        pub slice: Handle<Vec<String>>,
    }

    /// Plain copy of every value, for whole-set comparisons.
    #[derive(Debug, Default, PartialEq)]
    pub struct Snapshot {
        pub str: String,
        pub int: i64,
        pub float: f64,
        pub bool: bool,
        pub duration: Duration,
        pub slice: Vec<String>,
    }

    impl Vars {
        pub fn snapshot(&self) -> Snapshot {
            Snapshot {
                str: self.str.get(),
                int: self.int.get(),
                float: self.float.get(),
                bool: self.bool.get(),
                duration: self.duration.get(),
                slice: self.slice.get(),
            }
        }
    }

    /// A registry with one variable of every built-in kind, all defaulting
    /// to their zero value.
    pub fn pair() -> (Registry, Vars) {
        let mut registry = Registry::new("fixture");
        let vars = Vars {
            str: registry.string("str", Some('s'), "", "string"),
            int: registry.int("int", Some('i'), 0, "int"),
            float: registry.float("float", Some('f'), 0.0, "float"),
            bool: registry.bool("bool", Some('b'), false, "bool"),
            duration: registry.duration("duration", Some('d'), Duration::ZERO, "duration"),
            slice: registry.string_list("string-slice", Some('x'), &[], "collection of strings (repeatable)"),
        };
        (registry, vars)
    }

    /// Write `content` to `name` inside a fresh temp dir.
    pub fn temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    /// Fake environment from literal pairs.
    pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn pair_starts_at_zero_values() {
        let (registry, vars) = pair();
        assert_eq!(registry.len(), 6);
        assert_eq!(vars.snapshot(), Snapshot::default());
    }
}
