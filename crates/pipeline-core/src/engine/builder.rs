//! Builder para `FlowEngine`.
//!
//! Obliga a declarar el primer paso (fuente) y encadenar pasos cuyos tipos de
//! entrada y salida sean compatibles.
//!
//! - `EngineBuilderInit` es el estado inicial: stores presentes, sin pasos.
//! - `EngineBuilder<S, E, R>` recuerda el tipo `S::Output` del último paso y
//!   acumula los pasos como `Box<dyn StepDefinition>`.
//! - `add_step` exige `N::Input: SameAs<S::Output>`.
//!
//! ```ignore
//! let engine = FlowEngine::new()
//!     .first_step(InitStep::new(..))
//!     .add_step(PrepareStep::new(..))
//!     .with_default_step_timeout(Duration::from_secs(180))
//!     .build();
//! ```

use std::marker::PhantomData;
use std::time::Duration;

use crate::engine::FlowEngine;
use crate::event::EventStore;
use crate::injection::ParamInjector;
use crate::repo::FlowRepository;
use crate::step::{SameAs, StepDefinition, StepKind, TypedStep};

/// Estado inicial del builder.
#[derive(Debug)]
pub struct EngineBuilderInit<E: EventStore, R: FlowRepository> {
    pub event_store: E,
    pub repository: R,
    injectors: Vec<Box<dyn ParamInjector>>,
    default_step_timeout: Option<Duration>,
}

impl<E: EventStore, R: FlowRepository> EngineBuilderInit<E, R> {
    pub fn new(event_store: E, repository: R) -> Self {
        Self { event_store,
               repository,
               injectors: Vec::new(),
               default_step_timeout: None }
    }

    /// Define el primer paso del flujo y transiciona al builder completo.
    ///
    /// El primer paso debe ser `Source`; se verifica con `debug_assert!`.
    #[inline]
    pub fn first_step<S>(self, step: S) -> EngineBuilder<S, E, R>
        where S: TypedStep + 'static
    {
        debug_assert!(matches!(TypedStep::kind(&step), StepKind::Source),
                      "El primer paso debe ser de tipo Source");

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        injectors: self.injectors,
                        default_step_timeout: self.default_step_timeout,
                        steps: vec![Box::new(step)],
                        _out: PhantomData }
    }
}

/// Builder principal que acumula pasos y garantiza compatibilidad de tipos.
#[derive(Debug)]
pub struct EngineBuilder<S: TypedStep + 'static, E: EventStore, R: FlowRepository> {
    event_store: E,
    repository: R,
    injectors: Vec<Box<dyn ParamInjector>>,
    default_step_timeout: Option<Duration>,
    steps: Vec<Box<dyn StepDefinition>>,
    _out: PhantomData<fn() -> S::Output>,
}

impl<S: TypedStep + 'static, E: EventStore, R: FlowRepository> EngineBuilder<S, E, R> {
    /// Añade el siguiente paso; su input debe ser el output del anterior.
    #[inline]
    pub fn add_step<N>(mut self, next: N) -> EngineBuilder<N, E, R>
        where N: TypedStep + 'static,
              N::Input: SameAs<S::Output>
    {
        self.steps.push(Box::new(next));

        EngineBuilder { event_store: self.event_store,
                        repository: self.repository,
                        injectors: self.injectors,
                        default_step_timeout: self.default_step_timeout,
                        steps: self.steps,
                        _out: PhantomData }
    }

    /// Registra un inyector de parámetros (se aplican en orden de registro).
    pub fn with_injector(mut self, injector: Box<dyn ParamInjector>) -> Self {
        self.injectors.push(injector);
        self
    }

    pub fn with_default_step_timeout(mut self, timeout: Duration) -> Self {
        self.default_step_timeout = Some(timeout);
        self
    }

    /// Construye el `FlowEngine` con la definición derivada de los pasos
    /// como definición por defecto.
    #[inline]
    pub fn build(self) -> FlowEngine<E, R> {
        let mut engine = FlowEngine::new_with_stores(self.event_store, self.repository);
        for inj in self.injectors {
            engine.add_injector(inj);
        }
        engine.set_default_step_timeout(self.default_step_timeout);
        engine.set_default_definition(crate::repo::build_flow_definition_auto(self.steps));
        engine
    }
}
