//! Utility macros for the front end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_CONSTRUCT_HANDLER!` - Creates a lexer handler for a single construct character
//! - `INTERNAL_FAULT!` - Raises an internal fault with call-site context

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's payload text
/// * `$trace` - The source trace
/// * `$operator` - Optional operator table index (defaults to `None`)
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), trace);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $trace:expr) => {
        Token {
            kind: $kind,
            value: $value,
            operator: None,
            trace: $trace,
        }
    };
    ($kind:expr, $value:expr, $trace:expr, $operator:expr) => {
        Token {
            kind: $kind,
            value: $value,
            operator: Some($operator),
            trace: $trace,
        }
    };
}

/// Creates a lexer handler for a construct token such as `;` or `(`.
///
/// The generated handler pushes the construct and lets the lexer keep
/// track of bracket balance.
///
/// # Example
///
/// ```ignore
/// RegexPattern {
///     regex: Regex::new("^;").unwrap(),
///     handler: MK_CONSTRUCT_HANDLER!(TokenKind::Semicolon, ";"),
/// }
/// ```
#[macro_export]
macro_rules! MK_CONSTRUCT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _matched: &str| -> Result<(), Error> {
            lexer.push_construct($kind, $value)
        }
    };
}

/// Raises an `InternalFault` carrying the call site and any extra context.
///
/// The call site is recorded as `file`, `line`, `module` and `function`,
/// the path of the enclosing function (closures show up as `{{closure}}`
/// segments). Expands to an expression of type `!`, so it can stand in for
/// any value.
///
/// # Example
///
/// ```ignore
/// let operator = table.get(index).unwrap_or_else(|| {
///     INTERNAL_FAULT!("operator index out of range", "index" => index)
/// });
/// ```
#[macro_export]
macro_rules! INTERNAL_FAULT {
    ($message:expr $(, $key:literal => $value:expr)* $(,)?) => {
        $crate::errors::fault::InternalFault::new($message)
            .with("file", file!())
            .with("line", line!())
            .with("module", module_path!())
            .with("function", {
                fn here() {}
                fn name_of<T>(_: T) -> &'static str {
                    ::std::any::type_name::<T>()
                }
                let name = name_of(here);
                name.strip_suffix("::here").unwrap_or(name)
            })
            $(.with($key, $value))*
            .raise()
    };
}
