//! Expression rendering: turns annotation and default-value subtrees into
//! display strings without evaluating anything.
//!
//! Rendering never fails. Shapes outside the rules below fall back to a fixed
//! placeholder: [`TYPE_FALLBACK`] for annotations, [`VALUE_FALLBACK`] for
//! default values.

use crate::syntax::Expr;

/// Placeholder for annotations that cannot be rendered
pub const TYPE_FALLBACK: &str = "Any";

/// Placeholder for default values that cannot be rendered
pub const VALUE_FALLBACK: &str = "None";

/// Rendered default of an input field that declares none
pub const NO_DEFAULT: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Type,
    Value,
}

/// Renders a type annotation (`Dict[str, int]`, `typing.Optional[X]`, ...)
pub fn render_type(expr: &Expr) -> String {
    render(expr, Context::Type)
}

/// Renders a default value; adds list and mapping literals to the type rules
pub fn render_value(expr: &Expr) -> String {
    render(expr, Context::Value)
}

fn render(expr: &Expr, context: Context) -> String {
    match expr {
        Expr::Name(name) => name.clone(),
        Expr::Subscript { value, slice } => {
            let params = match slice.as_ref() {
                Expr::Tuple(elements) => join(elements, context),
                single => render(single, context),
            };
            format!("{}[{}]", render(value, context), params)
        }
        Expr::Attribute { value, attr } => format!("{}.{}", render(value, context), attr),
        Expr::Constant(constant) => constant.to_string(),
        Expr::Tuple(elements) => format!("({})", join(elements, context)),
        Expr::Call { func, args, .. } => match func.as_ref() {
            Expr::Name(name) => format!("{}({})", name, join(args, context)),
            _ => fallback(context),
        },
        Expr::List(elements) if context == Context::Value => {
            format!("[{}]", join(elements, context))
        }
        Expr::Dict(entries) if context == Context::Value => {
            let pairs: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", render(key, context), render(value, context)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        Expr::List(_) | Expr::Dict(_) | Expr::Unsupported(_) => fallback(context),
    }
}

fn join(elements: &[Expr], context: Context) -> String {
    elements
        .iter()
        .map(|element| render(element, context))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fallback(context: Context) -> String {
    match context {
        Context::Type => TYPE_FALLBACK.to_string(),
        Context::Value => VALUE_FALLBACK.to_string(),
    }
}
