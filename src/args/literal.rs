//! Best-effort evaluation of declaration arguments.
//!
//! The argument text is parsed by syn; only literal expressions evaluate:
//! strings, integers, floats, booleans, `None`, arrays, tuples, `vec![..]`
//! and primitive type names, seen through `Some(..)`, references and
//! `.to_string()`-style conversions. Any other name is reported as
//! [`EvalError::UndefinedName`] so the caller can drop the keyword using it.

use std::fmt;
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Expr, Lit, Token, UnOp};

/// Value of an evaluated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// A primitive type name such as `str` or `u32`
    Type(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Text shown in documentation tables.
    pub fn render(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Bool(b) => b.to_string(),
            Literal::Null => "null".to_string(),
            Literal::Type(t) => t.clone(),
            Literal::List(items) => format!(
                "[{}]",
                items.iter().map(Literal::render).collect::<Vec<_>>().join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A name that cannot be resolved from the text alone
    UndefinedName(String),
    Syntax(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UndefinedName(name) => write!(f, "name '{}' is not defined", name),
            EvalError::Syntax(msg) => write!(f, "invalid syntax: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

const KNOWN_TYPES: &[&str] = &[
    "str", "String", "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Vec", "HashMap",
];

fn syntax(msg: impl Into<String>) -> EvalError {
    EvalError::Syntax(msg.into())
}

/// Arguments of one call, split into positional and `key = value` ones.
#[derive(Debug, Default)]
pub struct CallArguments {
    pub positional: Vec<Expr>,
    pub keywords: Vec<(String, Expr)>,
}

/// Parses the comma-separated text between a call's parentheses.
pub fn parse_arguments(src: &str) -> Result<CallArguments, EvalError> {
    let exprs = Punctuated::<Expr, Token![,]>::parse_terminated
        .parse_str(src)
        .map_err(|e| syntax(e.to_string()))?;

    let mut arguments = CallArguments::default();
    for expr in exprs {
        match expr {
            Expr::Assign(assign) => {
                let keyword = match &*assign.left {
                    Expr::Path(path) => path.path.get_ident().map(|ident| ident.unraw().to_string()),
                    _ => None,
                };
                let Some(keyword) = keyword else {
                    return Err(syntax("keyword must be a plain name"));
                };
                arguments.keywords.push((keyword, *assign.right));
            }
            expr if arguments.keywords.is_empty() => arguments.positional.push(expr),
            _ => return Err(syntax("positional argument follows keyword argument")),
        }
    }
    Ok(arguments)
}

/// Evaluates a single expression given as source text.
pub fn eval_str(src: &str) -> Result<Literal, EvalError> {
    let expr = syn::parse_str::<Expr>(src).map_err(|e| syntax(e.to_string()))?;
    eval(&expr)
}

/// Evaluates a parsed expression.
pub fn eval(expr: &Expr) -> Result<Literal, EvalError> {
    match expr {
        Expr::Lit(lit) => eval_lit(&lit.lit),
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => match eval(&unary.expr)? {
            Literal::Int(i) => Ok(Literal::Int(-i)),
            Literal::Float(f) => Ok(Literal::Float(-f)),
            _ => Err(syntax("negation of a non-number")),
        },
        Expr::Path(path) if path.qself.is_none() => {
            let Some(ident) = path.path.get_ident() else {
                return Err(EvalError::UndefinedName(path_text(&path.path)));
            };
            let name = ident.unraw().to_string();
            match name.as_str() {
                "None" => Ok(Literal::Null),
                known if KNOWN_TYPES.contains(&known) => Ok(Literal::Type(name)),
                _ => Err(EvalError::UndefinedName(name)),
            }
        }
        Expr::Array(array) => eval_all(array.elems.iter()),
        Expr::Tuple(tuple) => eval_all(tuple.elems.iter()),
        Expr::Macro(mac) if mac.mac.path.is_ident("vec") => {
            let elems = mac
                .mac
                .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                .map_err(|e| syntax(e.to_string()))?;
            eval_all(elems.iter())
        }
        Expr::MethodCall(call) => match call.method.to_string().as_str() {
            "to_string" | "to_owned" | "into" if call.args.is_empty() => eval(&call.receiver),
            _ => Err(syntax(format!("unsupported method call .{}()", call.method))),
        },
        Expr::Call(call) => {
            let Expr::Path(func) = &*call.func else {
                return Err(syntax("unsupported call"));
            };
            let func = path_text(&func.path);
            match (func.as_str(), call.args.len()) {
                ("Some" | "String::from", 1) => eval(&call.args[0]),
                _ => Err(EvalError::UndefinedName(func)),
            }
        }
        Expr::Reference(reference) => eval(&reference.expr),
        Expr::Paren(paren) => eval(&paren.expr),
        Expr::Group(group) => eval(&group.expr),
        _ => Err(syntax("unsupported expression")),
    }
}

fn eval_lit(lit: &Lit) -> Result<Literal, EvalError> {
    match lit {
        Lit::Str(s) => Ok(Literal::Str(s.value())),
        Lit::Char(c) => Ok(Literal::Str(c.value().to_string())),
        Lit::Int(i) => i
            .base10_parse::<i64>()
            .map(Literal::Int)
            .map_err(|e| syntax(e.to_string())),
        Lit::Float(f) => f
            .base10_parse::<f64>()
            .map(Literal::Float)
            .map_err(|e| syntax(e.to_string())),
        Lit::Bool(b) => Ok(Literal::Bool(b.value)),
        _ => Err(syntax("unsupported literal")),
    }
}

fn eval_all<'a>(exprs: impl Iterator<Item = &'a Expr>) -> Result<Literal, EvalError> {
    exprs.map(eval).collect::<Result<Vec<_>, _>>().map(Literal::List)
}

fn path_text(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|segment| segment.ident.unraw().to_string())
        .collect::<Vec<_>>()
        .join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_eval_scalars() {
        assert_eq!(eval_str("\"life\"").unwrap(), Literal::Str("life".into()));
        assert_eq!(eval_str("r#\"x\"y\"#").unwrap(), Literal::Str("x\"y".into()));
        assert_eq!(eval_str("42").unwrap(), Literal::Int(42));
        assert_eq!(eval_str("-7i32").unwrap(), Literal::Int(-7));
        assert_eq!(eval_str("1_000").unwrap(), Literal::Int(1000));
        assert_eq!(eval_str("2.5").unwrap(), Literal::Float(2.5));
        assert_eq!(eval_str("false").unwrap(), Literal::Bool(false));
        assert_eq!(eval_str("None").unwrap(), Literal::Null);
    }

    #[test]
    fn test_eval_types_and_conversions() {
        assert_eq!(eval_str("str").unwrap(), Literal::Type("str".into()));
        assert_eq!(eval_str("&str").unwrap(), Literal::Type("str".into()));
        assert_eq!(eval_str("u32").unwrap(), Literal::Type("u32".into()));
        assert_eq!(eval_str("\"x\".to_string()").unwrap(), Literal::Str("x".into()));
        assert_eq!(eval_str("String::from(\"y\")").unwrap(), Literal::Str("y".into()));
        assert_eq!(eval_str("Some(3)").unwrap(), Literal::Int(3));
    }

    #[test]
    fn test_eval_sequences() {
        assert_eq!(
            eval_str("(\"json\", \"args\")").unwrap(),
            Literal::List(vec![Literal::Str("json".into()), Literal::Str("args".into())])
        );
        assert_eq!(eval_str("(1)").unwrap(), Literal::Int(1));
        assert_eq!(eval_str("(1,)").unwrap(), Literal::List(vec![Literal::Int(1)]));
        assert_eq!(
            eval_str("vec![1, 2]").unwrap(),
            Literal::List(vec![Literal::Int(1), Literal::Int(2)])
        );
        assert_eq!(eval_str("[]").unwrap(), Literal::List(vec![]));
    }

    #[test]
    fn test_eval_undefined_names() {
        assert_eq!(
            eval_str("validate_email").unwrap_err(),
            EvalError::UndefinedName("validate_email".into())
        );
        assert_eq!(
            eval_str("inputs::boolean").unwrap_err(),
            EvalError::UndefinedName("inputs::boolean".into())
        );
        assert_eq!(
            eval_str("checker(3)").unwrap_err(),
            EvalError::UndefinedName("checker".into())
        );
    }

    #[test]
    fn test_eval_syntax_errors() {
        assert!(matches!(eval_str(""), Err(EvalError::Syntax(_))));
        assert!(matches!(eval_str("\"open"), Err(EvalError::Syntax(_))));
        assert!(matches!(eval_str("1 2"), Err(EvalError::Syntax(_))));
        assert!(matches!(eval_str("x.len()"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_parse_arguments() {
        let call =
            parse_arguments("\"page\", r#type = u32, location = \"args\", help = \"a, b\",").unwrap();
        assert_eq!(call.positional.len(), 1);
        let keywords: Vec<&str> = call.keywords.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keywords, vec!["type", "location", "help"]);
        assert_eq!(eval(&call.keywords[2].1).unwrap().render(), "a, b");

        assert!(matches!(parse_arguments("a = 1, \"late\""), Err(EvalError::Syntax(_))));
        assert!(matches!(parse_arguments("a.b = 1"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_render() {
        let list = Literal::List(vec![Literal::Str("a".into()), Literal::Null, Literal::Int(1)]);
        assert_eq!(list.render(), "[a, null, 1]");
        assert_eq!(Literal::Bool(true).render(), "true");
    }
}
