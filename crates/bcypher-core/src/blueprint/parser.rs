//! API Blueprint parsing on top of `pulldown-cmark`.
//!
//! Only the structure the generator needs is extracted: groups, resources
//! (`## Name [/uri]`), actions (`### Name [VERB]` or `[VERB /uri]`) and
//! `+ Parameters` lists. Prose, requests and responses are skipped.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use reqwest::Method;

use crate::error::CoreError;

use super::types::{Action, Blueprint, Parameter, Resource, ResourceGroup};

enum Heading {
    Group(String),
    Resource { name: String, uri: String },
    Action {
        name: String,
        verb: String,
        uri: Option<String>,
    },
    Other,
}

/// Open list item whose leading text is still being collected.
struct ItemFrame {
    text: String,
    closed: bool,
    offset: usize,
}

#[derive(Default)]
struct Builder {
    groups: Vec<ResourceGroup>,
    resource_level: Option<usize>,
    action_level: Option<usize>,
}

impl Builder {
    fn current_resource(&mut self) -> Option<&mut Resource> {
        self.resource_level?;
        self.groups.last_mut()?.resources.last_mut()
    }

    fn close_sections(&mut self, level: usize) {
        if self.action_level.is_some_and(|l| level <= l) {
            self.action_level = None;
        }
        if self.resource_level.is_some_and(|l| level <= l) {
            self.resource_level = None;
            self.action_level = None;
        }
    }

    fn push_parameter(&mut self, parameter: Parameter) {
        let in_action = self.action_level.is_some();
        let Some(resource) = self.current_resource() else {
            return;
        };
        match resource.actions.last_mut() {
            Some(action) if in_action => action.parameters.push(parameter),
            _ => resource.parameters.push(parameter),
        }
    }
}

/// Parse an API Blueprint document.
pub fn parse_blueprint(text: &str) -> Result<Blueprint, CoreError> {
    let lines = LineIndex::new(text);
    let mut builder = Builder::default();

    let mut heading: Option<(usize, String, usize)> = None;
    let mut items: Vec<ItemFrame> = Vec::new();
    let mut list_depth = 0usize;
    let mut params_depth: Option<usize> = None;
    let mut in_code_block = false;

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                heading = Some((level as usize, String::new(), range.start));
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some((level, text, offset)) = heading.take() else {
                    continue;
                };
                apply_heading(&mut builder, level, &text)
                    .map_err(|message| parse_error(&lines, offset, message))?;
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                close_top(&mut items);
            }
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::End(TagEnd::Paragraph) => {
                if items.last().is_some_and(|top| !top.text.trim().is_empty()) {
                    close_top(&mut items);
                }
            }
            Event::Start(Tag::List(_)) => {
                if let Some(top) = items.last_mut() {
                    top.closed = true;
                    if list_depth == 1 && is_parameters_header(&top.text) {
                        params_depth = Some(list_depth + 1);
                    }
                }
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if params_depth.is_some_and(|depth| list_depth < depth) {
                    params_depth = None;
                }
            }
            Event::Start(Tag::Item) => items.push(ItemFrame {
                text: String::new(),
                closed: false,
                offset: range.start,
            }),
            Event::End(TagEnd::Item) => {
                let Some(item) = items.pop() else {
                    continue;
                };
                if params_depth == Some(list_depth) {
                    let parameter = parse_parameter(&item.text)
                        .map_err(|message| parse_error(&lines, item.offset, message))?;
                    builder.push_parameter(parameter);
                }
            }
            Event::Text(t) if !in_code_block => push_text(&mut heading, &mut items, &t),
            Event::Code(t) => push_text(&mut heading, &mut items, &format!("`{t}`")),
            Event::SoftBreak | Event::HardBreak => push_text(&mut heading, &mut items, " "),
            _ => {}
        }
    }

    if builder.groups.iter().all(|group| group.resources.is_empty()) {
        return Err(CoreError::BlueprintParse {
            line: 1,
            message: "blueprint declares no resources".to_owned(),
        });
    }

    Ok(Blueprint {
        groups: builder.groups,
    })
}

fn push_text(heading: &mut Option<(usize, String, usize)>, items: &mut [ItemFrame], text: &str) {
    if let Some((_, buf, _)) = heading {
        buf.push_str(text);
    } else if let Some(top) = items.last_mut().filter(|top| !top.closed) {
        top.text.push_str(text);
    }
}

fn close_top(items: &mut [ItemFrame]) {
    if let Some(top) = items.last_mut() {
        top.closed = true;
    }
}

fn apply_heading(builder: &mut Builder, level: usize, text: &str) -> Result<(), String> {
    match classify_heading(text)? {
        Heading::Group(name) => {
            builder.resource_level = None;
            builder.action_level = None;
            builder.groups.push(ResourceGroup {
                name: Some(name),
                resources: Vec::new(),
            });
        }
        Heading::Resource { name, uri } => {
            if builder.groups.is_empty() {
                builder.groups.push(ResourceGroup {
                    name: None,
                    resources: Vec::new(),
                });
            }
            if let Some(group) = builder.groups.last_mut() {
                group.resources.push(Resource {
                    name,
                    uri_template: uri,
                    parameters: Vec::new(),
                    actions: Vec::new(),
                });
            }
            builder.resource_level = Some(level);
            builder.action_level = None;
        }
        Heading::Action { name, verb, uri } => {
            let method = Method::from_bytes(verb.as_bytes())
                .map_err(|e| format!("invalid HTTP method `{verb}`: {e}"))?;
            builder.action_level = Some(level);
            let resource = builder
                .current_resource()
                .ok_or_else(|| format!("action `{name} [{verb}]` declared outside of a resource"))?;
            resource.actions.push(Action {
                name,
                method,
                uri_template: uri,
                parameters: Vec::new(),
            });
        }
        Heading::Other => builder.close_sections(level),
    }
    Ok(())
}

fn classify_heading(text: &str) -> Result<Heading, String> {
    let text = text.trim();
    if let Some(name) = text.strip_prefix("Group ") {
        return Ok(Heading::Group(name.trim().to_owned()));
    }

    let Some(inner_start) = text.rfind('[').filter(|_| text.ends_with(']')) else {
        return Ok(Heading::Other);
    };
    let name = text[..inner_start].trim().to_owned();
    let inner = text[inner_start + 1..text.len() - 1].trim();

    if inner.starts_with('/') {
        return Ok(Heading::Resource {
            name,
            uri: inner.to_owned(),
        });
    }
    if inner.is_empty() {
        return Err(format!("resource `{name}` declares an empty URI template"));
    }

    let (verb, uri) = match inner.split_once(char::is_whitespace) {
        Some((verb, uri)) => (verb, Some(uri.trim().to_owned())),
        None => (inner, None),
    };
    if verb.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(Heading::Action {
            name,
            verb: verb.to_owned(),
            uri: uri.filter(|uri| !uri.is_empty()),
        })
    } else {
        Ok(Heading::Other)
    }
}

fn is_parameters_header(text: &str) -> bool {
    matches!(text.trim(), "Parameters" | "Parameter")
}

/// Parse `name (attributes) ... description` or `name: example (attributes) - description`.
fn parse_parameter(text: &str) -> Result<Parameter, String> {
    let text = text.trim();
    let name_end = text
        .find(|c: char| c.is_whitespace() || c == '(' || c == ':')
        .unwrap_or(text.len());
    let name = text[..name_end].trim_matches('`').to_owned();
    if name.is_empty() {
        return Err(format!("parameter entry `{text}` has no name"));
    }

    let rest = &text[name_end..];
    let (attributes, tail) = match rest.find('(') {
        Some(open) => match rest[open + 1..].find(')') {
            Some(close) => (
                &rest[open + 1..open + 1 + close],
                &rest[open + close + 2..],
            ),
            None => ("", rest),
        },
        None => ("", rest),
    };
    let required = !attributes
        .split(',')
        .any(|attr| attr.trim() == "optional");

    let description = tail
        .split_once("...")
        .or_else(|| tail.split_once(" - "))
        .map(|(_, desc)| desc.trim().to_owned())
        .unwrap_or_default();

    Ok(Parameter {
        name,
        required,
        description,
    })
}

fn parse_error(lines: &LineIndex, offset: usize, message: String) -> CoreError {
    CoreError::BlueprintParse {
        line: lines.line_of(offset),
        message,
    }
}

/// Byte offset → 1-based line number.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::SAMPLE_BLUEPRINT;

    #[test]
    fn parses_groups_resources_and_actions() {
        let bp = parse_blueprint(SAMPLE_BLUEPRINT).expect("sample must parse");
        let group_names: Vec<_> = bp.groups.iter().map(|g| g.name.as_deref()).collect();
        assert_eq!(
            group_names,
            vec![Some("Blockchain"), Some("Addresses"), Some("Wallets")]
        );

        let block = bp.resources().find(|r| r.name == "Block").expect("Block resource");
        assert_eq!(block.uri_template, "/v1/{coin}/{chain}/blocks/{hash}{?txstart,limit}");
        assert_eq!(block.actions.len(), 1);
        assert_eq!(block.actions[0].method, Method::GET);
        let params: Vec<_> = block.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, vec!["hash", "txstart", "limit"]);
        assert!(block.parameters[0].required);
        assert!(!block.parameters[1].required);
        assert_eq!(block.parameters[0].description, "Block hash or height.");
    }

    #[test]
    fn request_and_response_bodies_are_ignored() {
        let bp = parse_blueprint(SAMPLE_BLUEPRINT).expect("sample must parse");
        let wallets = bp
            .resources()
            .find(|r| r.name == "Wallet Collection")
            .expect("Wallet Collection");
        assert!(wallets.parameters.is_empty());
        let verbs: Vec<_> = wallets.actions.iter().map(|a| a.method.clone()).collect();
        assert_eq!(verbs, vec![Method::GET, Method::POST, Method::PATCH]);
    }

    #[test]
    fn action_level_parameters_and_uri() {
        let doc = "\
## Address [/v1/{coin}/{chain}/addrs/{address}]

+ Parameters
    + address (string) ... The address.

### Get Address [GET]

### Full Address [GET /v1/{coin}/{chain}/addrs/{address}/full{?before}]

+ Parameters
    + before (optional, number) ... Block height filter.
";
        let bp = parse_blueprint(doc).expect("must parse");
        assert_eq!(bp.groups.len(), 1);
        assert_eq!(bp.groups[0].name, None);

        let res = &bp.groups[0].resources[0];
        assert_eq!(res.parameters.len(), 1);
        assert_eq!(res.actions[0].uri_template, None);
        assert_eq!(
            res.actions[1].uri_template.as_deref(),
            Some("/v1/{coin}/{chain}/addrs/{address}/full{?before}")
        );
        assert_eq!(res.actions[1].parameters[0].name, "before");
    }

    #[test]
    fn backticked_parameter_names_and_dash_descriptions() {
        let doc = "\
## Hook [/hooks/{id}]

+ Parameters
    + `id`: `abc-123` (string) - Hook identifier.

### Get Hook [GET]
";
        let bp = parse_blueprint(doc).expect("must parse");
        let param = &bp.groups[0].resources[0].parameters[0];
        assert_eq!(param.name, "id");
        assert_eq!(param.description, "Hook identifier.");
    }

    #[test]
    fn action_outside_resource_reports_line() {
        let doc = "# API\n\nIntro text.\n\n### Get Thing [GET]\n";
        let err = parse_blueprint(doc).expect_err("must fail");
        match err {
            CoreError::BlueprintParse { line, message } => {
                assert_eq!(line, 5);
                assert!(message.contains("outside of a resource"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_resource_uri_is_rejected() {
        let err = parse_blueprint("## Thing []\n").expect_err("must fail");
        assert!(err.to_string().contains("empty URI template"));
    }

    #[test]
    fn nameless_parameter_is_rejected() {
        let doc = "## Thing [/things/{id}]\n\n+ Parameters\n    + (string) ... Nothing.\n";
        match parse_blueprint(doc).expect_err("must fail") {
            CoreError::BlueprintParse { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("has no name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn document_without_resources_is_rejected() {
        let err = parse_blueprint("# Just prose\n\nNothing here.\n").expect_err("must fail");
        assert!(err.to_string().contains("no resources"));
    }

    #[test]
    fn prose_heading_closes_resource() {
        let doc = "\
## Block [/blocks/{hash}]

### Get Block [GET]

## Notes

+ Parameters
    + stray (string) ... Not a block parameter.
";
        let bp = parse_blueprint(doc).expect("must parse");
        assert!(bp.groups[0].resources[0].parameters.is_empty());
    }

    #[test]
    fn line_index_maps_offsets() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
    }
}
