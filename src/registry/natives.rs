//! Importing host classes: native types, adapters, static member lookups.

use std::sync::Arc;

use super::{ImportReport, Registry};
use crate::diagnostics::ImportError;
use crate::host::{ClassDescriptor, ClassSource, MemberKind};
use crate::symbols::Symbol;
use crate::types::native::NativeType;

impl Registry {
    /// Lift a host class and bind it in the root package under its canonical
    /// name. Registering a class twice keeps the first type; the duplicate
    /// binding is logged and the existing type returned.
    pub fn register_native_class<S: ClassSource + ?Sized>(&mut self, class: &S) -> Result<Arc<NativeType>, ImportError> {
        let descriptor = self.describe(class)?;
        let ty = match self.types.complete(&descriptor) {
            Ok(ty) => ty,
            Err(err) => {
                self.error_logger
                    .error(&format!("Unable to register native class {}", descriptor.name), Some(&err));
                return Err(err);
            }
        };

        let symbol = Arc::new(Symbol::Type(Arc::clone(&ty)));
        if self.root.put(ty.name(), symbol, self.error_logger.as_ref()) {
            tracing::debug!(class = %descriptor.name, name = %ty.name(), "registered native class");
        }
        Ok(ty)
    }

    /// Import every class, continuing past failures.
    pub fn register_native_classes<'a, S, I>(&mut self, classes: I) -> ImportReport
    where
        S: ClassSource + ?Sized + 'a,
        I: IntoIterator<Item = &'a S>,
    {
        let mut report = ImportReport::default();
        for class in classes {
            match self.register_native_class(class) {
                Ok(_) => report.imported += 1,
                Err(err) => report.failed.push(err),
            }
        }
        report
    }

    /// Bind a copy of `class`'s type at `package.SimpleName`, with the named
    /// methods of `class` added as static members.
    ///
    /// An empty package (or one naming the root) binds at the top level. A
    /// trailing `.` on the package is ignored. Named methods that are missing
    /// or fail to resolve are logged and skipped.
    pub fn register_adapter<S: ClassSource + ?Sized>(
        &mut self,
        class: &S,
        package: &str,
        methods: &[&str],
    ) -> Result<Arc<NativeType>, ImportError> {
        let descriptor = self.describe(class)?;
        let base = match self.types.complete(&descriptor) {
            Ok(ty) => ty,
            Err(err) => {
                self.error_logger
                    .error(&format!("Unable to register adapter {}", descriptor.name), Some(&err));
                return Err(err);
            }
        };

        let mut adapter = (*base).clone();
        for &name in methods {
            let mut found = false;
            for member in descriptor.members_named(name).filter(|m| m.is_method()) {
                found = true;
                if !member.is_public() {
                    self.error_logger
                        .warning(&format!("Skipping non-public adapter method {}.{name}", descriptor.name));
                    continue;
                }
                match self.types.resolve_method(&descriptor.name, member) {
                    Ok(method) => {
                        adapter.add_static_method(Arc::new(method));
                    }
                    Err(err) => self
                        .error_logger
                        .error(&format!("Unable to expose adapter method {}.{name}", descriptor.name), Some(&err)),
                }
            }
            if !found {
                self.error_logger
                    .warning(&format!("Adapter class {} has no method named {name}", descriptor.name));
            }
        }

        let package = package.trim_end_matches('.');
        let path = if package.is_empty() || package == self.config.root_name {
            descriptor.simple_name().to_string()
        } else {
            format!("{package}.{}", descriptor.simple_name())
        };

        let adapter = Arc::new(adapter);
        let symbol = Arc::new(Symbol::Type(Arc::clone(&adapter)));
        if self.root.put(&path, symbol, self.error_logger.as_ref()) {
            tracing::debug!(class = %descriptor.name, %path, methods = methods.len(), "registered adapter");
        }
        Ok(adapter)
    }

    /// Look up the public static method `name` of `class` whose parameters
    /// are exactly `arg_types`.
    pub fn get_static_function<S: ClassSource + ?Sized>(
        &self,
        class: &S,
        name: &str,
        arg_types: &[&str],
    ) -> Result<Arc<Symbol>, ImportError> {
        let descriptor = class.describe()?;
        let context = format!("{}.{name}", descriptor.name);
        let wanted = arg_types
            .iter()
            .map(|ty| self.types.resolve_type(ty, &context))
            .collect::<Result<Vec<_>, _>>()?;

        let candidates = descriptor
            .members_named(name)
            .filter(|m| m.is_method() && m.is_static && m.is_public());
        for member in candidates {
            // An overload with unresolvable types cannot be the one asked for.
            let Ok(method) = self.types.resolve_method(&descriptor.name, member) else {
                continue;
            };
            if method.params == wanted {
                return Ok(Arc::new(Symbol::StaticMethod(Arc::new(method))));
            }
        }

        Err(ImportError::NoSuchMethod {
            class: descriptor.name.clone(),
            name: name.to_string(),
            args: arg_types.join(", "),
        })
    }

    /// Look up the public static field `name` of `class`. Failures are
    /// logged and yield `None`.
    pub fn get_static_field<S: ClassSource + ?Sized>(&self, class: &S, name: &str) -> Option<Arc<Symbol>> {
        let descriptor = match class.describe() {
            Ok(descriptor) => descriptor,
            Err(err) => {
                self.error_logger.error(&format!("Unable to get static field: {name}"), Some(&err));
                return None;
            }
        };
        match self.static_field(&descriptor, name) {
            Ok(symbol) => Some(symbol),
            Err(err) => {
                self.error_logger.error(
                    &format!("Unable to get static field: {name} from class {}", descriptor.name),
                    Some(&err),
                );
                None
            }
        }
    }

    fn static_field(&self, descriptor: &ClassDescriptor, name: &str) -> Result<Arc<Symbol>, ImportError> {
        let field = descriptor
            .members_named(name)
            .find(|m| matches!(m.kind, MemberKind::Field { .. }))
            .ok_or_else(|| ImportError::NoSuchField { class: descriptor.name.clone(), name: name.to_string() })?;
        if !field.is_public() {
            return Err(ImportError::AccessDenied { class: descriptor.name.clone(), name: name.to_string() });
        }
        if !field.is_static {
            return Err(ImportError::NotStatic { class: descriptor.name.clone(), name: name.to_string() });
        }
        let field = self.types.resolve_field(&descriptor.name, field)?;
        Ok(Arc::new(Symbol::StaticField(Arc::new(field))))
    }

    fn describe<'s, S: ClassSource + ?Sized>(&self, class: &'s S) -> Result<std::borrow::Cow<'s, ClassDescriptor>, ImportError> {
        class.describe().inspect_err(|err| {
            self.error_logger.error("Unable to describe host class", Some(err));
        })
    }
}
