/// Replaces `{}` placeholders in `template` with `values`, in order.
///
/// Surplus placeholders are left as they are.
///
/// # Example
/// ```
/// use modscript::diagnostics::format_message;
/// let msg = format_message("`{}` is exported more than once by `{}`.", &["Tick", "com.example.clock"]);
/// assert_eq!(msg, "`Tick` is exported more than once by `com.example.clock`.");
/// ```
pub fn format_message(template: &str, values: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    let mut values = values.iter();
    while let Some(at) = rest.find("{}") {
        let Some(value) = values.next() else {
            break;
        };
        result.push_str(&rest[..at]);
        result.push_str(value);
        rest = &rest[at + 2..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders_in_order() {
        assert_eq!(format_message("{} and {}", &["a", "b"]), "a and b");
    }

    #[test]
    fn values_are_not_rescanned() {
        assert_eq!(format_message("x={} y={}", &["{}", "2"]), "x={} y=2");
    }

    #[test]
    fn missing_values_leave_placeholders() {
        assert_eq!(format_message("{} {}", &["only"]), "only {}");
        assert_eq!(format_message("none", &["extra"]), "none");
    }
}
