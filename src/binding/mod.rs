//! # Argument Binding Module
//!
//! Resolves a handler's declared parameters into concrete values before the
//! handler runs.
//!
//! ## Overview
//!
//! Every handler carries a list of [`ParamSpec`] descriptors, declared once
//! at registration. At dispatch time each descriptor is resolved by the
//! first applicable strategy, in strict priority order:
//!
//! 1. **Name match**: the request input map holds a field with the
//!    parameter's name (path captures already merged, so path wins).
//! 2. **Request**: the parameter is declared as the request itself.
//! 3. **Container**: the parameter names a service type registered in the
//!    container. A container miss falls through.
//! 4. **Default**: the descriptor carries a default value.
//! 5. **Nullable**: the descriptor is nullable; the argument binds to null.
//!
//! A parameter no strategy can satisfy fails the request with
//! `DispatchError::UnresolvableDependency` before any route middleware runs.
//!
//! ## Example
//!
//! ```rust,ignore
//! app.get("/pets/{id}", Handler::func(
//!     vec![
//!         ParamSpec::input("id"),
//!         ParamSpec::service::<PetStore>("store"),
//!         ParamSpec::input("format").with_default(json!("full")),
//!     ],
//!     |_req, args| {
//!         let store = args.service::<PetStore>("store").unwrap();
//!         store.fetch(args.text("id").unwrap(), args.text("format").unwrap())
//!     },
//! ))?;
//! ```

mod core;

pub use core::{
    bind, Action, ActionFn, Args, BoundArg, Handler, ParamSpec, ParamTy, MAX_INLINE_ARGS,
};

pub(crate) use core::HandlerKind;
