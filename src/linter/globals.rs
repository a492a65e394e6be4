/*!
# Predefined Globals

Built-in identifiers every linted text knows about, plus named
environments that configs and directive comments can switch on.
Resolved names become read-only variables in the global scope, so
rules checking for undefined or unused variables see them.
*/

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::scope::ScopeManager;

/// Names every runtime provides
static BUILTIN: &[&str] = &[
    "Array", "Boolean", "Date", "Error", "EvalError", "Function", "Infinity", "JSON", "Math",
    "NaN", "Number", "Object", "RangeError", "ReferenceError", "RegExp", "String", "SyntaxError",
    "TypeError", "URIError", "decodeURI", "decodeURIComponent", "encodeURI", "encodeURIComponent",
    "eval", "isFinite", "isNaN", "parseFloat", "parseInt", "undefined",
];

static BROWSER: &[&str] = &[
    "alert", "atob", "btoa", "clearInterval", "clearTimeout", "console", "document", "history",
    "localStorage", "location", "navigator", "screen", "sessionStorage", "setInterval",
    "setTimeout", "window", "XMLHttpRequest",
];

static NODE: &[&str] = &[
    "Buffer", "__dirname", "__filename", "clearInterval", "clearTimeout", "console", "exports",
    "global", "module", "process", "require", "setInterval", "setTimeout",
];

static ES6: &[&str] = &[
    "ArrayBuffer", "DataView", "Float32Array", "Float64Array", "Int16Array", "Int32Array",
    "Int8Array", "Map", "Promise", "Proxy", "Reflect", "Set", "Symbol", "Uint16Array",
    "Uint32Array", "Uint8Array", "WeakMap", "WeakSet",
];

static ENVIRONMENTS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    map.insert("browser", BROWSER);
    map.insert("node", NODE);
    map.insert("es6", ES6);
    map
});

/// Registry of known environments
#[derive(Debug, Default)]
pub struct Environments;

impl Environments {
    pub fn new() -> Self {
        Self
    }

    pub fn has(&self, name: &str) -> bool {
        ENVIRONMENTS.contains_key(name)
    }

    /// Globals of one environment; unknown names resolve to nothing
    pub fn globals_of(&self, name: &str) -> &'static [&'static str] {
        ENVIRONMENTS.get(name).copied().unwrap_or(&[])
    }

    /// Defines the builtin globals plus those of the enabled
    /// environments, all read-only
    pub fn apply(&self, scopes: &mut ScopeManager, enabled: &[String]) {
        for &name in BUILTIN {
            scopes.define_global(name, false);
        }
        for env in enabled {
            for &name in self.globals_of(env) {
                scopes.define_global(name, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parser::{ParserAdapter, ReferenceParser};

    #[test]
    fn test_known_environments() {
        let environments = Environments::new();
        assert!(environments.has("browser"));
        assert!(environments.has("node"));
        assert!(environments.has("es6"));
        assert!(!environments.has("rhino"));
        assert!(environments.globals_of("rhino").is_empty());
    }

    #[test]
    fn test_apply_defines_read_only_globals() {
        let output = ReferenceParser::new().parse("x;").unwrap();
        let mut scopes = ScopeManager::analyze(&output.ast);
        Environments::new().apply(&mut scopes, &["node".to_string()]);

        let global = scopes.global_scope();
        assert!(global.get_variable("parseInt").is_some());
        let process = global.get_variable("process").unwrap();
        assert!(!process.writeable);
        assert!(global.get_variable("window").is_none());
    }
}
