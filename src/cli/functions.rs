//! Listing of the default constants and functions

use crate::builtins;

/// One line per constant and function, e.g. `round  1 to 2 arguments`.
pub fn list_functions() -> String {
    let mut out = String::from("Constants:\n");
    for (name, value) in builtins::constants() {
        out.push_str(&format!("  {:<6} {}\n", name, value.to_plain_string()));
    }

    out.push_str("\nFunctions:\n");
    for builtin in builtins::functions() {
        out.push_str(&format!("  {:<6} {}\n", builtin.name, builtin.arity));
    }
    out
}
