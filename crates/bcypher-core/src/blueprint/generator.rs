//! Builds a callable method table from a parsed blueprint.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::rest::{ApiRequest, Query, Transport};
use crate::uri_template::UriTemplate;

use super::naming::{method_name, namespace};
use super::types::{Blueprint, Parameter, Resource};

/// Arguments for one invocation of a [`GeneratedMethod`].
///
/// Positional arguments map onto the method's declared parameters in order;
/// `None` or empty arguments leave that parameter unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodCall {
    args: Vec<Option<String>>,
    data: Option<Query>,
}

impl MethodCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl fmt::Display) -> Self {
        self.args.push(Some(value.to_string()));
        self
    }

    /// Leave the next positional parameter unset.
    pub fn skip(mut self) -> Self {
        self.args.push(None);
        self
    }

    /// Request data. Sent as the JSON body, or as query parameters for `GET`.
    pub fn data(mut self, data: Query) -> Self {
        self.data = Some(data);
        self
    }
}

/// One blueprint action bound to a coin/chain and token.
pub struct GeneratedMethod {
    name: String,
    verb: Method,
    template: UriTemplate,
    parameters: Vec<Parameter>,
    coin: String,
    chain: String,
    token: Option<String>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for GeneratedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedMethod")
            .field("name", &self.name)
            .field("verb", &self.verb)
            .field("template", &self.template.as_str())
            .field("parameters", &self.parameter_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl GeneratedMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn uri_template(&self) -> &str {
        self.template.as_str()
    }

    /// Declared parameters, in positional order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }

    /// Resolve `call` into the request this method would send.
    pub fn prepare(&self, call: MethodCall) -> ApiRequest {
        let MethodCall { args, data } = call;
        let (mut query, body) = if self.verb == Method::GET {
            (data.unwrap_or_default(), None)
        } else {
            (Query::new(), data.map(Value::Object))
        };
        if let Some(token) = &self.token {
            query.insert("token".to_owned(), Value::String(token.clone()));
        }

        let mut values = BTreeMap::new();
        values.insert("coin".to_owned(), self.coin.clone());
        values.insert("chain".to_owned(), self.chain.clone());
        if let Some(token) = &self.token {
            values.insert("token".to_owned(), token.clone());
        }
        for (param, arg) in self.parameters.iter().zip(args) {
            if let Some(arg) = arg.filter(|arg| !arg.is_empty()) {
                values.insert(param.name.clone(), arg);
            }
        }

        ApiRequest::new(self.verb.clone(), self.template.expand(&values))
            .with_query(query)
            .with_body(body)
    }

    pub async fn call(&self, call: MethodCall) -> Result<Value, CoreError> {
        let request = self.prepare(call);
        debug!(method = %self.name, http.method = %request.method, http.path = %request.path, "generated call");
        self.transport.send(request).await
    }
}

/// Methods generated for one resource namespace, e.g. `wallets`.
#[derive(Debug, Default)]
pub struct Namespace {
    methods: BTreeMap<String, GeneratedMethod>,
}

impl Namespace {
    pub fn get(&self, method: &str) -> Option<&GeneratedMethod> {
        self.methods.get(method)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// The API generated for one coin/chain pair.
#[derive(Debug)]
pub struct GeneratedApi {
    coin: String,
    chain: String,
    namespaces: BTreeMap<String, Namespace>,
}

impl GeneratedApi {
    pub fn coin(&self) -> &str {
        &self.coin
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &Namespace)> {
        self.namespaces.iter().map(|(name, ns)| (name.as_str(), ns))
    }

    pub fn method(&self, namespace: &str, method: &str) -> Result<&GeneratedMethod, CoreError> {
        self.namespaces
            .get(namespace)
            .and_then(|ns| ns.get(method))
            .ok_or_else(|| CoreError::UnknownMethod {
                namespace: namespace.to_owned(),
                method: method.to_owned(),
            })
    }

    pub async fn call(
        &self,
        namespace: &str,
        method: &str,
        call: MethodCall,
    ) -> Result<Value, CoreError> {
        self.method(namespace, method)?.call(call).await
    }
}

/// Generate the method table for `coin`/`chain`.
///
/// Actions whose verb has no naming rule are logged and skipped. When two
/// actions resolve to the same `namespace.method`, the later one wins.
pub fn generate_api(
    blueprint: &Blueprint,
    coin: &str,
    chain: &str,
    token: Option<&str>,
    transport: Arc<dyn Transport>,
) -> Result<GeneratedApi, CoreError> {
    let coin = coin.to_lowercase();
    let mut namespaces: BTreeMap<String, Namespace> = BTreeMap::new();

    for resource in blueprint.resources() {
        let ns = namespaces.entry(namespace(&resource.name)).or_default();
        let resource_template = UriTemplate::parse(&resource.uri_template)?;

        for action in &resource.actions {
            let Some(name) = method_name(&resource.name, &action.method) else {
                warn!(
                    resource = %resource.name,
                    method = %action.method,
                    "unknown resource method, skipping"
                );
                continue;
            };

            let template = match &action.uri_template {
                Some(uri) => UriTemplate::parse(uri)?,
                None => resource_template.clone(),
            };
            let generated = GeneratedMethod {
                name: name.clone(),
                verb: action.method.clone(),
                template,
                parameters: declared_parameters(resource, &action.parameters),
                coin: coin.clone(),
                chain: chain.to_owned(),
                token: token.map(str::to_owned),
                transport: transport.clone(),
            };
            if ns.methods.insert(name.clone(), generated).is_some() {
                debug!(resource = %resource.name, method = %name, "replacing previously generated method");
            }
        }
    }

    Ok(GeneratedApi {
        coin,
        chain: chain.to_owned(),
        namespaces,
    })
}

/// Resource parameters first, then action-only ones.
fn declared_parameters(resource: &Resource, action_params: &[Parameter]) -> Vec<Parameter> {
    let mut params = resource.parameters.clone();
    for param in action_params {
        if !params.iter().any(|p| p.name == param.name) {
            params.push(param.clone());
        }
    }
    params
}
