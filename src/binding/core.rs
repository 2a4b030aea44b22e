//! Binding core - descriptors, resolution, and the invocable action type.

use crate::container::{Component, Container};
use crate::error::DispatchError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use serde_json::Value;
use smallvec::SmallVec;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// Maximum bound arguments before heap allocation.
/// Most handlers declare ≤4 parameters.
pub const MAX_INLINE_ARGS: usize = 4;

type ArgVec = SmallVec<[(Arc<str>, BoundArg); MAX_INLINE_ARGS]>;

/// What a parameter is declared to be bound from.
#[derive(Debug, Clone)]
pub enum ParamTy {
    /// A field of the request input map.
    Input,
    /// The request itself.
    Request,
    /// A shared service resolved from the container by type.
    Service {
        id: TypeId,
        type_name: &'static str,
    },
}

/// Declaration of one handler parameter, built at registration time.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub(crate) name: Arc<str>,
    pub(crate) ty: ParamTy,
    pub(crate) default: Option<Value>,
    pub(crate) nullable: bool,
}

impl ParamSpec {
    /// Parameter bound from the input map by name.
    pub fn input(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            ty: ParamTy::Input,
            default: None,
            nullable: false,
        }
    }

    /// Parameter bound to the request itself.
    pub fn request(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            ty: ParamTy::Request,
            default: None,
            nullable: false,
        }
    }

    /// Parameter bound to the container service of type `T`.
    pub fn service<T: Any>(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            ty: ParamTy::Service {
                id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
            default: None,
            nullable: false,
        }
    }

    /// Value to bind when no earlier strategy applies.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Permit binding to null when no earlier strategy applies.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One resolved argument, tagged with the strategy that produced it.
#[derive(Clone)]
pub enum BoundArg {
    /// Strategy 1: value from the input map.
    Input(Value),
    /// Strategy 2: the request itself (handlers receive it separately).
    Request,
    /// Strategy 3: shared service instance from the container.
    Service(Arc<dyn Any + Send + Sync>),
    /// Strategy 4: the descriptor's default value.
    Default(Value),
    /// Strategy 5: nullable parameter with nothing to bind.
    Null,
}

impl std::fmt::Debug for BoundArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundArg::Input(value) => f.debug_tuple("Input").field(value).finish(),
            BoundArg::Request => write!(f, "Request"),
            BoundArg::Service(_) => write!(f, "Service(..)"),
            BoundArg::Default(value) => f.debug_tuple("Default").field(value).finish(),
            BoundArg::Null => write!(f, "Null"),
        }
    }
}

/// Arguments resolved for one handler invocation.
#[derive(Clone)]
pub struct Args {
    args: ArgVec,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.args.iter().map(|(k, _)| k.as_ref()))
            .finish()
    }
}

impl Args {
    /// Empty argument set, for invoking an action outside dispatch.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            args: ArgVec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The raw bound argument, if the parameter exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundArg> {
        self.args
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, arg)| arg)
    }

    /// The bound JSON value, for input- or default-bound parameters.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.get(name)? {
            BoundArg::Input(value) | BoundArg::Default(value) => Some(value),
            _ => None,
        }
    }

    /// The bound value as a string slice, if it is a JSON string.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(Value::as_str)
    }

    /// The bound service, downcast to its concrete type.
    #[must_use]
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        match self.get(name)? {
            BoundArg::Service(service) => Arc::clone(service).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Whether the parameter bound to null via its nullable flag.
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        matches!(self.get(name), Some(BoundArg::Null))
    }
}

/// Resolve `specs` against the request and container.
///
/// `handler` labels the route in the error when a parameter cannot be bound.
pub fn bind(
    req: &Request,
    specs: &[ParamSpec],
    container: &Container,
    handler: &str,
) -> Result<Args, DispatchError> {
    let mut args = ArgVec::new();
    for spec in specs {
        let arg = if let Some(value) = req.input(&spec.name) {
            BoundArg::Input(value.clone())
        } else if matches!(spec.ty, ParamTy::Request) {
            BoundArg::Request
        } else if let ParamTy::Service { id, .. } = &spec.ty {
            match container.resolve(id) {
                Some(service) => BoundArg::Service(service),
                None => fallback(spec, handler)?,
            }
        } else {
            fallback(spec, handler)?
        };
        args.push((Arc::clone(&spec.name), arg));
    }
    debug!(handler = %handler, params = specs.len(), "Arguments bound");
    Ok(Args { args })
}

fn fallback(spec: &ParamSpec, handler: &str) -> Result<BoundArg, DispatchError> {
    if let Some(value) = &spec.default {
        return Ok(BoundArg::Default(value.clone()));
    }
    if spec.nullable {
        return Ok(BoundArg::Null);
    }
    Err(DispatchError::UnresolvableDependency {
        handler: handler.to_string(),
        parameter: spec.name.to_string(),
    })
}

/// Boxed handler function invoked with the request and its bound arguments.
pub type ActionFn = Arc<dyn Fn(&Request, &Args) -> Result<Response, DispatchError> + Send + Sync>;

/// An invocable handler: parameter descriptors plus the function itself.
///
/// Built once at registration, shared immutably during dispatch.
#[derive(Clone)]
pub struct Action {
    params: Arc<[ParamSpec]>,
    func: ActionFn,
}

impl Action {
    /// Action from an infallible function returning any [`IntoResponse`].
    pub fn new<F, R>(params: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(&Request, &Args) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self {
            params: params.into(),
            func: Arc::new(move |req, args| Ok(func(req, args).into_response())),
        }
    }

    /// Action from a fallible function; errors pass through the dispatcher
    /// untouched as `DispatchError::Handler`.
    pub fn fallible<F, R>(params: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(&Request, &Args) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self {
            params: params.into(),
            func: Arc::new(move |req, args| match func(req, args) {
                Ok(value) => Ok(value.into_response()),
                Err(err) => Err(DispatchError::Handler(err)),
            }),
        }
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub(crate) fn invoke(&self, req: &Request, args: &Args) -> Result<Response, DispatchError> {
        (self.func)(req, args)
    }
}

/// Handler declaration accepted by route registration.
///
/// A closed union: either a function (already an [`Action`]) or a reference
/// to a named action on a container component. Both resolve to an `Action`
/// at registration time, so a missing component or unknown action name is a
/// startup error.
pub struct Handler {
    pub(crate) kind: HandlerKind,
}

pub(crate) enum HandlerKind {
    Func(Action),
    Component {
        id: TypeId,
        type_name: &'static str,
        method: String,
    },
}

impl Handler {
    /// Handler from an infallible function.
    pub fn func<F, R>(params: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(&Request, &Args) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Handler {
            kind: HandlerKind::Func(Action::new(params, func)),
        }
    }

    /// Handler from a fallible function.
    pub fn fallible<F, R>(params: Vec<ParamSpec>, func: F) -> Self
    where
        F: Fn(&Request, &Args) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoResponse,
    {
        Handler {
            kind: HandlerKind::Func(Action::fallible(params, func)),
        }
    }

    /// Handler delegating to the action named `method` on the container
    /// component of type `C`.
    pub fn component<C: Component>(method: &str) -> Self {
        Handler {
            kind: HandlerKind::Component {
                id: TypeId::of::<C>(),
                type_name: std::any::type_name::<C>(),
                method: method.to_string(),
            },
        }
    }
}

impl From<Action> for Handler {
    fn from(action: Action) -> Self {
        Handler {
            kind: HandlerKind::Func(action),
        }
    }
}
