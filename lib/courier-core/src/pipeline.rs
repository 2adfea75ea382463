//! Sequential task pipeline with arity adaptation.
//!
//! A pipeline is an ordered list of [`Task`]s threaded together in
//! continuation-passing style. Each task declares how many values it takes
//! ([`Task::arity`]) and receives a [`Next`] continuation as its last input:
//!
//! - [`Next::proceed`] hands values to the following task,
//! - [`Next::fail`] aborts the whole pipeline with an error,
//! - not calling `next` at all makes the task's own result the outcome.
//!
//! Before a task runs, the values forwarded by the previous step are
//! adapted to its arity: extra values are dropped, missing ones are padded
//! with `None`. A task therefore never has to know how many values its
//! predecessor chose to forward.
//!
//! Tasks run one after the other; a task is awaited before the next starts.
//!
//! # Example
//!
//! ```
//! use courier_core::pipeline::{Next, Pipeline, TaskFn, Values};
//!
//! # async fn demo() {
//! let pipeline = Pipeline::<i32, String>::new()
//!     .task(TaskFn::new(|(a,): (Option<i32>,), next: Next<i32, String>| {
//!         next.proceed(Values::from_iter([a.map(|a| a + 1), Some(10)]))
//!     }))
//!     .task(TaskFn::new(|(a, b): (Option<i32>, Option<i32>), next: Next<i32, String>| {
//!         next.proceed(Values::one(a.unwrap_or(0) * b.unwrap_or(0)))
//!     }));
//!
//! let result = pipeline.run(Values::one(1)).await;
//! assert_eq!(result.map(Values::into_single), Ok(Some(20)));
//! # }
//! ```

use std::fmt;
use std::future::{self, Future};
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;

/// The outcome of a pipeline run or of one of its steps.
pub type Outcome<V, E> = Result<Values<V>, E>;

/// A task shared between pipeline runs.
pub type SharedTask<V, E> = Arc<dyn Task<V, E>>;

// ============================================================================
// Values
// ============================================================================

/// Values threaded from one task to the next.
///
/// `None` marks an absent value, used when padding a short list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Values<V> {
    items: Vec<Option<V>>,
}

impl<V> Values<V> {
    /// No values.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// A single present value.
    #[must_use]
    pub fn one(value: V) -> Self {
        Self {
            items: vec![Some(value)],
        }
    }

    /// Number of values, absent ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the values.
    #[must_use]
    pub fn as_slice(&self) -> &[Option<V>] {
        &self.items
    }

    /// Adapt to `arity` values: truncate when there are enough, pad with
    /// `None` on the right otherwise.
    #[must_use]
    pub fn adapt(mut self, arity: usize) -> Self {
        if self.items.len() >= arity {
            self.items.truncate(arity);
        } else {
            self.items.resize_with(arity, || None);
        }
        self
    }

    /// Unwrap the single-value case: the first value, if present.
    ///
    /// Use [`Values::into_vec`] to keep every value.
    #[must_use]
    pub fn into_single(self) -> Option<V> {
        self.items.into_iter().next().flatten()
    }

    /// Consume into the full list of values.
    #[must_use]
    pub fn into_vec(self) -> Vec<Option<V>> {
        self.items
    }
}

impl<V> Default for Values<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> From<Vec<Option<V>>> for Values<V> {
    fn from(items: Vec<Option<V>>) -> Self {
        Self { items }
    }
}

impl<V> FromIterator<Option<V>> for Values<V> {
    fn from_iter<I: IntoIterator<Item = Option<V>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Task & continuation
// ============================================================================

/// One step of a pipeline.
pub trait Task<V, E>: Send + Sync {
    /// Number of values this task takes, not counting the continuation.
    fn arity(&self) -> usize;

    /// Run the task with exactly [`Task::arity`] values.
    ///
    /// The task either returns the result of `next`, or produces its own
    /// outcome without calling it.
    fn call(&self, args: Values<V>, next: Next<V, E>) -> BoxFuture<'static, Outcome<V, E>>;
}

/// Continuation handed to each task.
pub struct Next<V, E> {
    tasks: Arc<[SharedTask<V, E>]>,
    position: usize,
}

impl<V, E> fmt::Debug for Next<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl<V, E> Next<V, E> {
    /// Number of tasks that have not run yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tasks.len().saturating_sub(self.position)
    }
}

impl<V, E> Next<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// Continue with the following task, or finish with `values` if there is
    /// none.
    pub fn proceed(self, values: Values<V>) -> BoxFuture<'static, Outcome<V, E>> {
        run_from(self.tasks, self.position, values)
    }

    /// Abort the pipeline with `error`. No later task runs.
    pub fn fail(self, error: E) -> BoxFuture<'static, Outcome<V, E>> {
        Box::pin(future::ready(Err(error)))
    }

    /// Continue on `Ok`, abort on `Err`.
    pub fn resume(self, step: Outcome<V, E>) -> BoxFuture<'static, Outcome<V, E>> {
        match step {
            Ok(values) => self.proceed(values),
            Err(error) => self.fail(error),
        }
    }
}

fn run_from<V, E>(
    tasks: Arc<[SharedTask<V, E>]>,
    position: usize,
    values: Values<V>,
) -> BoxFuture<'static, Outcome<V, E>>
where
    V: Send + 'static,
    E: Send + 'static,
{
    Box::pin(async move {
        let Some(task) = tasks.get(position).cloned() else {
            return Ok(values);
        };
        let args = values.adapt(task.arity());
        let next = Next {
            tasks,
            position: position + 1,
        };
        task.call(args, next).await
    })
}

/// Run `tasks` in order, starting from `initial`.
///
/// Succeeds with the values of the last continuation when every task has
/// run; fails with the first error a task signals.
pub async fn pipeline<V, E>(tasks: Arc<[SharedTask<V, E>]>, initial: Values<V>) -> Outcome<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    run_from(tasks, 0, initial).await
}

/// An ordered, cheaply clonable list of tasks.
pub struct Pipeline<V, E> {
    tasks: Vec<SharedTask<V, E>>,
}

impl<V, E> fmt::Debug for Pipeline<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

impl<V, E> Clone for Pipeline<V, E> {
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
        }
    }
}

impl<V, E> Default for Pipeline<V, E> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<V, E> Pipeline<V, E>
where
    V: Send + 'static,
    E: Send + 'static,
{
    /// An empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task.
    #[must_use]
    pub fn task(mut self, task: impl Task<V, E> + 'static) -> Self {
        self.tasks.push(Arc::new(task));
        self
    }

    /// Append an already shared task.
    #[must_use]
    pub fn shared(mut self, task: SharedTask<V, E>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if the pipeline has no task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run the pipeline, see [`pipeline`].
    pub fn run(&self, initial: Values<V>) -> BoxFuture<'static, Outcome<V, E>> {
        run_from(Arc::from(self.tasks.as_slice()), 0, initial)
    }
}

impl<V, E> FromIterator<SharedTask<V, E>> for Pipeline<V, E> {
    fn from_iter<I: IntoIterator<Item = SharedTask<V, E>>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Typed closures
// ============================================================================

/// Fixed-size argument tuples for closure tasks.
///
/// The tuple type decides the task's arity once, when the task is built.
pub trait Args<V>: Sized {
    /// Number of values in the tuple.
    const ARITY: usize;

    /// Build the tuple from values already adapted to [`Args::ARITY`].
    fn from_values(values: Values<V>) -> Self;
}

impl<V> Args<V> for () {
    const ARITY: usize = 0;

    fn from_values(_values: Values<V>) -> Self {}
}

macro_rules! impl_args {
    ($arity:literal => $($slot:ident),+) => {
        impl<V> Args<V> for ($(impl_args!(@slot $slot V),)+) {
            const ARITY: usize = $arity;

            fn from_values(values: Values<V>) -> Self {
                let mut slots = values.into_vec().into_iter();
                ($({
                    let $slot = slots.next().flatten();
                    $slot
                },)+)
            }
        }
    };
    (@slot $slot:ident $v:ident) => { Option<$v> };
}

impl_args!(1 => a);
impl_args!(2 => a, b);
impl_args!(3 => a, b, c);
impl_args!(4 => a, b, c, d);

/// A task built from a closure taking an [`Args`] tuple and a [`Next`].
pub struct TaskFn<F, A> {
    f: F,
    _args: PhantomData<fn(A)>,
}

impl<F, A> TaskFn<F, A> {
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            _args: PhantomData,
        }
    }
}

impl<F, A> fmt::Debug for TaskFn<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("arity", &std::any::type_name::<A>())
            .finish_non_exhaustive()
    }
}

impl<V, E, F, A, Fut> Task<V, E> for TaskFn<F, A>
where
    A: Args<V>,
    F: Fn(A, Next<V, E>) -> Fut + Send + Sync,
    Fut: Future<Output = Outcome<V, E>> + Send + 'static,
{
    fn arity(&self) -> usize {
        A::ARITY
    }

    fn call(&self, args: Values<V>, next: Next<V, E>) -> BoxFuture<'static, Outcome<V, E>> {
        Box::pin((self.f)(A::from_values(args), next))
    }
}
