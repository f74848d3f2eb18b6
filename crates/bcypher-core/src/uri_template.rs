//! RFC 6570 URI templates.
//!
//! Supports the level 1–3 operators (`+ # . / ; ? &`) and parses the level 4
//! prefix (`:n`) and explode (`*`) modifiers. Values are plain strings, so
//! explode has no visible effect; prefix truncates by characters.

use std::collections::BTreeMap;

use crate::error::CoreError;

/// Characters passed through unencoded by the `+` and `#` operators.
const RESERVED: &str = ":/?#[]@!$&'()*+,;=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Reserved,
    Fragment,
    Label,
    Path,
    PathParam,
    Query,
    QueryContinuation,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Reserved),
            '#' => Some(Self::Fragment),
            '.' => Some(Self::Label),
            '/' => Some(Self::Path),
            ';' => Some(Self::PathParam),
            '?' => Some(Self::Query),
            '&' => Some(Self::QueryContinuation),
            _ => None,
        }
    }

    fn first(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved => "",
            Self::Fragment => "#",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query => "?",
            Self::QueryContinuation => "&",
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Simple | Self::Reserved | Self::Fragment => ",",
            Self::Label => ".",
            Self::Path => "/",
            Self::PathParam => ";",
            Self::Query | Self::QueryContinuation => "&",
        }
    }

    fn named(self) -> bool {
        matches!(self, Self::PathParam | Self::Query | Self::QueryContinuation)
    }

    fn allow_reserved(self) -> bool {
        matches!(self, Self::Reserved | Self::Fragment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VarSpec {
    name: String,
    prefix: Option<usize>,
    explode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression { op: Operator, vars: Vec<VarSpec> },
}

/// A parsed URI template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    parts: Vec<Part>,
}

impl UriTemplate {
    pub fn parse(template: &str) -> Result<Self, CoreError> {
        let err = |message: String| CoreError::UriTemplate {
            template: template.to_owned(),
            message,
        };

        let mut parts = Vec::new();
        let mut rest = template;
        while !rest.is_empty() {
            match rest.find('{') {
                None => {
                    reject_stray_close(rest).map_err(err)?;
                    parts.push(Part::Literal(rest.to_owned()));
                    break;
                }
                Some(open) => {
                    if open > 0 {
                        reject_stray_close(&rest[..open]).map_err(err)?;
                        parts.push(Part::Literal(rest[..open].to_owned()));
                    }
                    let after = &rest[open + 1..];
                    let close = after
                        .find('}')
                        .ok_or_else(|| err("unclosed expression".to_owned()))?;
                    parts.push(parse_expression(&after[..close]).map_err(err)?);
                    rest = &after[close + 1..];
                }
            }
        }

        Ok(Self {
            source: template.to_owned(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let Part::Expression { vars, .. } = part {
                for var in vars {
                    if !names.contains(&var.name.as_str()) {
                        names.push(&var.name);
                    }
                }
            }
        }
        names
    }

    /// Expand against `values`. Undefined variables are omitted, together
    /// with their operator prefix when the whole expression is empty.
    pub fn expand(&self, values: &BTreeMap<String, String>) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression { op, vars } => expand_expression(*op, vars, values, &mut out),
            }
        }
        out
    }
}

fn reject_stray_close(literal: &str) -> Result<(), String> {
    if literal.contains('}') {
        Err("unmatched `}`".to_owned())
    } else {
        Ok(())
    }
}

fn parse_expression(body: &str) -> Result<Part, String> {
    let mut chars = body.chars();
    let (op, list) = match chars.next() {
        None => return Err("empty expression".to_owned()),
        Some(c) => match Operator::from_char(c) {
            Some(op) => (op, chars.as_str()),
            None => (Operator::Simple, body),
        },
    };
    if list.is_empty() {
        return Err("empty expression".to_owned());
    }

    let vars = list
        .split(',')
        .map(parse_varspec)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Part::Expression { op, vars })
}

fn parse_varspec(spec: &str) -> Result<VarSpec, String> {
    let (name, prefix, explode) = if let Some(name) = spec.strip_suffix('*') {
        (name, None, true)
    } else if let Some((name, len)) = spec.split_once(':') {
        let len = len
            .parse::<usize>()
            .ok()
            .filter(|len| (1..10_000).contains(len))
            .ok_or_else(|| format!("invalid prefix length in `{spec}`"))?;
        (name, Some(len), false)
    } else {
        (spec, None, false)
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '%');
    if !valid {
        return Err(format!("invalid variable name `{name}`"));
    }

    Ok(VarSpec {
        name: name.to_owned(),
        prefix,
        explode,
    })
}

fn expand_expression(
    op: Operator,
    vars: &[VarSpec],
    values: &BTreeMap<String, String>,
    out: &mut String,
) {
    let mut first = true;
    for var in vars {
        let Some(value) = values.get(&var.name) else {
            continue;
        };

        out.push_str(if first { op.first() } else { op.separator() });
        first = false;

        let value: String = match var.prefix {
            Some(len) => value.chars().take(len).collect(),
            None => value.clone(),
        };

        if op.named() {
            out.push_str(&var.name);
            if value.is_empty() {
                if op != Operator::PathParam {
                    out.push('=');
                }
                continue;
            }
            out.push('=');
        }
        out.push_str(&encode(&value, op.allow_reserved()));
    }
}

fn encode(value: &str, allow_reserved: bool) -> String {
    if !allow_reserved {
        return urlencoding::encode(value).into_owned();
    }

    let mut out = String::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if c.is_ascii_alphanumeric() || "-._~".contains(c) || RESERVED.contains(c) || c == '%' {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}
