#![forbid(unsafe_code)]

//! The navigation stack reconciler.
//!
//! A [`NavigationStack`] keeps a [`StackExecutor`]'s live screens in step
//! with an application-owned path. Path changes are observed through a
//! [`PathStore`] subscription, coalesced onto the next [`RunLoop`] turn, and
//! applied as one executor command.
//!
//! # Apply pass
//!
//! The desired path is diffed against the identifiers of the live screens
//! (screens created outside the path carry none and are skipped). The first
//! rule that fits wins:
//!
//! | Difference | Command |
//! |------------|---------|
//! | none | nothing; re-install the root if the container is empty |
//! | any, container empty | `set_all` with a fresh root below the path screens |
//! | one insertion at the end | `push` |
//! | one removal at the end | `pop` |
//! | only removals, path now empty | `pop_to_root` |
//! | only removals, one trailing run | `pop_to` the last surviving screen |
//! | anything else | `set_all`, reusing live screens with equal identifiers |
//!
//! # Invariants
//!
//! 1. A live screen is never recreated while its identifier stays in the
//!    path; `set_all` moves it with [`StackEntry::Existing`].
//! 2. Every identifier the stack resolves or drops is written back to the
//!    path, so the path always describes what is on screen.
//! 3. Write-backs never schedule another apply pass.
//! 4. At most one apply pass is pending at any time.
//! 5. Work triggered by the executor (did-show handling, dismissal) runs on
//!    a later turn, never inside the executor's own call.
//! 6. Delegate callbacks run after the executor call that raised them
//!    returns, in the order they were raised.
//! 7. A dismissal applies with the transaction that was current when the
//!    screen asked for it.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No destination for an element | Element dropped from the path, `UnregisteredDestination` reported |
//! | Codable element fails to decode | Element dropped from the path, `DecodeFailed` reported |
//! | Container popped screens itself | Path truncated to the live screens on the next turn |
//! | Path changed again before that turn | Truncation skipped |
//! | Stack stopped | Path changes are ignored; screen actions report `OutsideNavigationContext` |

use std::any::TypeId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::{AHashMap, AHashSet};
use navkit_core::{
    AnyValue, CodableValue, Difference, Issue, NavigationId, NavigationPath, PathValue,
    Transaction, report_issue, type_tag, with_transaction,
};
use navkit_runtime::{Binding, BindingScope, RunLoop};

use crate::config::StackConfig;
use crate::context::{ContextHost, ScreenContext};
use crate::executor::{
    EventSink, NewScreen, ScreenId, StackDelegate, StackEntry, StackEvents, StackExecutor,
};
use crate::registry::DestinationRegistry;
use crate::store::{ErasedPathStore, PathStore, TypedPathStore};

type RootFactory<S> = Box<dyn Fn() -> S>;

/// A live screen and the identifier it was created from, if any.
type LiveEntry = (ScreenId, Option<NavigationId>);

/// An appearance event waiting for the executor borrow to end.
#[derive(Debug, Clone, Copy)]
enum ShowEvent {
    Will(ScreenId, bool),
    Did(ScreenId, bool),
}

// ---------------------------------------------------------------------------
// NavigationStack
// ---------------------------------------------------------------------------

/// Drives a [`StackExecutor`] from a navigation path.
///
/// Dropping the stack, or calling [`stop`](Self::stop), ends observation of
/// the path.
pub struct NavigationStack<E: StackExecutor> {
    shared: Rc<Shared<E>>,
}

struct Shared<E: StackExecutor> {
    this: Weak<Shared<E>>,
    executor: RefCell<E>,
    store: Box<dyn PathStore>,
    registry: RefCell<DestinationRegistry<E::Screen>>,
    root: RootFactory<E::Screen>,
    root_id: Cell<Option<ScreenId>>,
    ids: RefCell<AHashMap<ScreenId, NavigationId>>,
    delegate: RefCell<Option<Rc<dyn StackDelegate>>>,
    shows: RefCell<Vec<ShowEvent>>,
    observation: RefCell<BindingScope>,
    run_loop: RunLoop,
    config: StackConfig,
    scheduled: Cell<bool>,
    applying: Cell<bool>,
    driving: Cell<bool>,
    animated: Cell<bool>,
    stopped: Cell<bool>,
}

impl<E> NavigationStack<E>
where
    E: StackExecutor + 'static,
    E::Screen: 'static,
{
    /// Create a stack driving `executor` from `store`.
    ///
    /// If the executor is empty, a root screen is built with `root` and
    /// installed right away. The first apply pass runs on the next turn of
    /// `run_loop`, without animation.
    pub fn new(
        executor: E,
        store: impl PathStore + 'static,
        root: impl Fn() -> E::Screen + 'static,
        run_loop: &RunLoop,
        config: StackConfig,
    ) -> Self {
        let shared = Rc::new_cyclic(|this| Shared {
            this: this.clone(),
            executor: RefCell::new(executor),
            store: Box::new(store),
            registry: RefCell::new(DestinationRegistry::new()),
            root: Box::new(root),
            root_id: Cell::new(None),
            ids: RefCell::new(AHashMap::new()),
            delegate: RefCell::new(None),
            shows: RefCell::new(Vec::new()),
            observation: RefCell::new(BindingScope::new()),
            run_loop: run_loop.clone(),
            config,
            scheduled: Cell::new(false),
            applying: Cell::new(false),
            driving: Cell::new(false),
            animated: Cell::new(false),
            stopped: Cell::new(false),
        });

        let events = shared.events();
        shared.executor.borrow_mut().attach(events);

        let weak = Rc::downgrade(&shared);
        let observation = shared.store.subscribe(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.path_changed();
            }
        }));
        shared.observation.borrow_mut().hold(observation);

        shared.install_root();
        shared.schedule_reconcile();
        Self { shared }
    }

    /// Create a stack over a heterogeneous path with the default config.
    pub fn with_path(
        executor: E,
        path: &Binding<NavigationPath>,
        root: impl Fn() -> E::Screen + 'static,
        run_loop: &RunLoop,
    ) -> Self {
        Self::new(
            executor,
            ErasedPathStore::new(path.clone()),
            root,
            run_loop,
            StackConfig::default(),
        )
    }

    /// Create a stack over a homogeneous path with the default config.
    pub fn with_typed_path<T: PathValue>(
        executor: E,
        path: &Binding<Vec<T>>,
        root: impl Fn() -> E::Screen + 'static,
        run_loop: &RunLoop,
    ) -> Self {
        Self::new(
            executor,
            TypedPathStore::new(path.clone()),
            root,
            run_loop,
            StackConfig::default(),
        )
    }

    /// Register the screen factory for path values of type `T`.
    ///
    /// Replaces any earlier factory for `T`. If the path holds unresolved
    /// elements of type `T`, an apply pass is scheduled.
    pub fn navigation_destination<T: PathValue>(
        &self,
        factory: impl Fn(T) -> E::Screen + 'static,
    ) -> &Self {
        self.shared.registry.borrow_mut().register(factory);
        self.shared
            .destination_registered(TypeId::of::<T>(), type_tag::<T>());
        self
    }

    /// Register the screen factory for `T` and allow elements of `T`
    /// restored from a codable path to be decoded.
    pub fn codable_navigation_destination<T: CodableValue>(
        &self,
        factory: impl Fn(T) -> E::Screen + 'static,
    ) -> &Self {
        self.shared.registry.borrow_mut().register_codable(factory);
        self.shared
            .destination_registered(TypeId::of::<T>(), type_tag::<T>());
        self
    }

    /// Append `value` to the path.
    pub fn push_value<T: PathValue>(&self, value: T) {
        self.shared.store.append(NavigationId::eager(value));
    }

    /// Append a value that can be persisted with the path.
    pub fn push_codable<T: CodableValue>(&self, value: T) {
        self.shared
            .store
            .append(NavigationId::Eager(AnyValue::codable(value)));
    }

    /// The current path.
    #[must_use]
    pub fn path(&self) -> Vec<NavigationId> {
        self.shared.store.elements()
    }

    /// Identifiers of the live screens, bottom to top.
    #[must_use]
    pub fn live_ids(&self) -> Vec<NavigationId> {
        self.shared.live_ids()
    }

    /// The identifier `screen` was created from.
    #[must_use]
    pub fn navigation_id(&self, screen: ScreenId) -> Option<NavigationId> {
        self.shared.ids.borrow().get(&screen).cloned()
    }

    /// The root screen installed by this stack.
    #[must_use]
    pub fn root_id(&self) -> Option<ScreenId> {
        self.shared.root_id.get()
    }

    /// Run an apply pass now instead of waiting for the run loop.
    pub fn reconcile_now(&self) {
        self.shared.reconcile();
    }

    /// Observe will/did show events alongside the stack.
    pub fn set_delegate(&self, delegate: impl StackDelegate + 'static) {
        *self.shared.delegate.borrow_mut() = Some(Rc::new(delegate));
    }

    /// Remove the delegate.
    pub fn clear_delegate(&self) {
        self.shared.delegate.borrow_mut().take();
    }

    /// A fresh event channel into this stack.
    #[must_use]
    pub fn events(&self) -> StackEvents {
        self.shared.events()
    }

    /// The executor.
    #[must_use]
    pub fn executor(&self) -> Ref<'_, E> {
        self.shared.executor.borrow()
    }

    /// Mutable access to the executor, for direct container manipulation.
    #[must_use]
    pub fn executor_mut(&self) -> RefMut<'_, E> {
        self.shared.executor.borrow_mut()
    }

    /// The registered destinations.
    #[must_use]
    pub fn registry(&self) -> Ref<'_, DestinationRegistry<E::Screen>> {
        self.shared.registry.borrow()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> StackConfig {
        self.shared.config
    }

    /// Whether an apply pass is waiting for the run loop.
    #[must_use]
    pub fn is_reconcile_pending(&self) -> bool {
        self.shared.scheduled.get()
    }

    /// Permanently stop reacting to the path and the executor.
    pub fn stop(&self) {
        if self.shared.stopped.replace(true) {
            return;
        }
        self.shared.observation.borrow_mut().clear();
        tracing::debug!("navigation stack stopped");
    }

    /// Whether [`stop`](Self::stop) was called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.get()
    }
}

impl<E: StackExecutor> fmt::Debug for NavigationStack<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationStack")
            .field("path_len", &self.shared.store.elements().len())
            .field("tracked_screens", &self.shared.ids.borrow().len())
            .field("scheduled", &self.shared.scheduled.get())
            .field("stopped", &self.shared.stopped.get())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Observation and scheduling
// ---------------------------------------------------------------------------

impl<E> Shared<E>
where
    E: StackExecutor + 'static,
    E::Screen: 'static,
{
    fn events(&self) -> StackEvents {
        let sink: Weak<dyn EventSink> = self.this.clone();
        StackEvents::new(sink)
    }

    fn context_for(&self, screen: ScreenId) -> ScreenContext {
        let host: Weak<dyn ContextHost> = self.this.clone();
        ScreenContext::new(screen, host)
    }

    fn path_changed(&self) {
        if self.applying.get() || self.stopped.get() {
            return;
        }
        if Transaction::current().disables_animations {
            self.animated.set(false);
        }
        self.schedule_reconcile();
    }

    fn schedule_reconcile(&self) {
        if self.stopped.get() || self.scheduled.replace(true) {
            return;
        }
        let weak = self.this.clone();
        self.run_loop.schedule(move || {
            if let Some(shared) = weak.upgrade() {
                shared.scheduled.set(false);
                shared.reconcile();
            }
        });
    }

    fn destination_registered(&self, type_id: TypeId, tag: &str) {
        let pending = self.store.elements().iter().any(|id| match id {
            NavigationId::Eager(_) => false,
            NavigationId::Lazy(value) => value.type_id() == type_id,
            NavigationId::Codable(element) => element.tag() == tag,
        });
        if pending {
            tracing::debug!(type_name = tag, "destination registered for pending path elements");
            self.animated.set(false);
            self.schedule_reconcile();
        }
    }

    fn write_back(&self, elements: Vec<NavigationId>) {
        self.applying.set(true);
        self.store.set_elements(elements);
        self.applying.set(false);
    }

    // -----------------------------------------------------------------------
    // Live state
    // -----------------------------------------------------------------------

    fn live(&self) -> Vec<LiveEntry> {
        let ids = self.ids.borrow();
        self.executor
            .borrow()
            .screen_ids()
            .into_iter()
            .map(|screen| (screen, ids.get(&screen).cloned()))
            .collect()
    }

    fn live_ids(&self) -> Vec<NavigationId> {
        self.live().into_iter().filter_map(|(_, id)| id).collect()
    }

    fn prune(&self) {
        let live: AHashSet<ScreenId> = self.executor.borrow().screen_ids().into_iter().collect();
        self.ids.borrow_mut().retain(|screen, _| live.contains(screen));
    }

    fn new_screen(&self, screen: E::Screen, id: NavigationId) -> NewScreen<E::Screen> {
        let screen_id = ScreenId::next();
        self.ids.borrow_mut().insert(screen_id, id);
        NewScreen {
            id: screen_id,
            screen,
            context: self.context_for(screen_id),
        }
    }

    fn root_entry(&self) -> StackEntry<E::Screen> {
        let id = ScreenId::next();
        self.root_id.set(Some(id));
        StackEntry::New(NewScreen {
            id,
            screen: (self.root)(),
            context: self.context_for(id),
        })
    }

    fn install_root(&self) {
        let existing = self.executor.borrow().screen_ids().first().copied();
        match existing {
            Some(root) => self.root_id.set(Some(root)),
            None => {
                let entry = self.root_entry();
                self.drive(|executor| executor.set_all(vec![entry], false));
            }
        }
    }

    /// Run one executor command, then deliver the appearance events it
    /// raised once the borrow has ended.
    fn drive(&self, command: impl FnOnce(&mut E)) {
        self.driving.set(true);
        command(&mut *self.executor.borrow_mut());
        self.driving.set(false);
        self.flush_shows();
    }

    // -----------------------------------------------------------------------
    // Apply pass
    // -----------------------------------------------------------------------

    fn reconcile(&self) {
        if self.stopped.get() {
            return;
        }
        let animated = self.config.animations_enabled && self.animated.replace(true);
        let desired = self.store.elements();
        let live = self.live();
        let live_ids: Vec<NavigationId> = live.iter().filter_map(|(_, id)| id.clone()).collect();
        let _span = tracing::debug_span!(
            "navigation_reconcile",
            desired = desired.len(),
            live = live_ids.len(),
            animated
        )
        .entered();

        let diff = Difference::between(&live_ids, &desired);
        if diff.is_empty() {
            if live.is_empty() {
                tracing::trace!(op = "recover_root", "container is empty");
                let entry = self.root_entry();
                self.drive(|executor| executor.set_all(vec![entry], false));
            } else {
                tracing::trace!(op = "noop", "path matches the stack");
            }
            return;
        }

        if !live.is_empty()
            && diff.is_single_push(desired.len())
            && self.push_last(&desired, animated)
        {
            return;
        }

        if diff.insertions().is_empty() {
            if desired.is_empty() {
                tracing::trace!(op = "pop_to_root", removed = diff.len());
                self.drive(|executor| executor.pop_to_root(animated));
                self.prune();
                return;
            }
            if let Some(start) = diff.trailing_removal_start(desired.len()) {
                let path_screens: Vec<ScreenId> = live
                    .iter()
                    .filter(|(_, id)| id.is_some())
                    .map(|(screen, _)| *screen)
                    .collect();
                let top = live.last().map(|(screen, _)| *screen);
                if diff.is_single_pop(desired.len()) && top == path_screens.last().copied() {
                    tracing::trace!(op = "pop");
                    self.drive(|executor| executor.pop(animated));
                    self.prune();
                    return;
                }
                if let Some(&target) = path_screens.get(start - 1) {
                    tracing::trace!(op = "pop_to", %target, removed = diff.len());
                    self.drive(|executor| executor.pop_to(target, animated));
                    self.prune();
                    return;
                }
            }
        }

        self.rebuild(&desired, &live, animated);
    }

    /// Push the last element of `desired`. `false` if it cannot be built,
    /// leaving the failure to the full rebuild.
    fn push_last(&self, desired: &[NavigationId], animated: bool) -> bool {
        let index = desired.len() - 1;
        let built = {
            let registry = self.registry.borrow();
            registry.resolve(&desired[index], index).ok().and_then(|value| {
                let screen = registry.make_screen(&value)?;
                Some((value, screen))
            })
        };
        let Some((value, screen)) = built else {
            return false;
        };
        let eager = NavigationId::Eager(value);
        if eager != desired[index] {
            let mut resolved = desired.to_vec();
            resolved[index] = eager.clone();
            self.write_back(resolved);
        }
        let new = self.new_screen(screen, eager);
        tracing::trace!(op = "push", screen = %new.id);
        self.drive(|executor| executor.push(new, animated));
        true
    }

    fn rebuild(&self, desired: &[NavigationId], live: &[LiveEntry], animated: bool) {
        let mut entries = Vec::with_capacity(live.len() + desired.len() + 1);
        let mut claimed: AHashSet<ScreenId> = AHashSet::new();
        if live.is_empty() {
            tracing::trace!(op = "recover_root", "container is empty");
            entries.push(self.root_entry());
        }

        // Keep the matching prefix, and unidentified screens inside it.
        let mut kept = 0;
        for (screen, id) in live {
            if let Some(id) = id {
                if desired.get(kept) != Some(id) {
                    break;
                }
                kept += 1;
            }
            claimed.insert(*screen);
            entries.push(StackEntry::Existing(*screen));
        }

        let mut resolved: Vec<NavigationId> = desired[..kept].to_vec();
        let (mut reused, mut created, mut dropped) = (0_usize, 0_usize, 0_usize);
        {
            let registry = self.registry.borrow();
            for (index, id) in desired.iter().enumerate().skip(kept) {
                let value = match registry.resolve(id, index) {
                    Ok(value) => value,
                    Err(issue) => {
                        report_issue(issue);
                        dropped += 1;
                        continue;
                    }
                };
                let eager = NavigationId::Eager(value.clone());
                let reuse = live
                    .iter()
                    .find(|(screen, live_id)| {
                        !claimed.contains(screen) && live_id.as_ref() == Some(&eager)
                    })
                    .map(|(screen, _)| *screen);
                match reuse {
                    Some(screen) => {
                        claimed.insert(screen);
                        entries.push(StackEntry::Existing(screen));
                        reused += 1;
                    }
                    None => match registry.make_screen(&value) {
                        Some(screen) => {
                            entries.push(StackEntry::New(self.new_screen(screen, eager.clone())));
                            created += 1;
                        }
                        None => {
                            report_issue(Issue::UnregisteredDestination {
                                type_name: value.type_name().to_owned(),
                            });
                            dropped += 1;
                            continue;
                        }
                    },
                }
                resolved.push(eager);
            }
        }

        if resolved.as_slice() != desired {
            self.write_back(resolved);
        }
        tracing::trace!(
            op = "set_all",
            kept,
            reused,
            created,
            dropped,
            screens = entries.len()
        );
        self.drive(|executor| executor.set_all(entries, animated));
        self.prune();
    }

    // -----------------------------------------------------------------------
    // Executor-originated changes
    // -----------------------------------------------------------------------

    fn delegate(&self) -> Option<Rc<dyn StackDelegate>> {
        self.delegate.borrow().clone()
    }

    fn queue_show(&self, event: ShowEvent) {
        if self.delegate.borrow().is_none() {
            return;
        }
        let first = {
            let mut shows = self.shows.borrow_mut();
            shows.push(event);
            shows.len() == 1
        };
        // Raised under a borrow held by the application: deliver next turn.
        if first && !self.driving.get() {
            let weak = self.this.clone();
            self.run_loop.schedule(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.flush_shows();
                }
            });
        }
    }

    fn flush_shows(&self) {
        let shows = std::mem::take(&mut *self.shows.borrow_mut());
        let Some(delegate) = self.delegate() else {
            return;
        };
        for event in shows {
            match event {
                ShowEvent::Will(screen, animated) => delegate.will_show(screen, animated),
                ShowEvent::Did(screen, animated) => delegate.did_show(screen, animated),
            }
        }
    }

    fn after_did_show(&self, version: u64) {
        if self.stopped.get() {
            return;
        }
        if self.store.version() != version || self.scheduled.get() {
            tracing::trace!("path changed since the screen appeared; skipping sync");
            return;
        }
        let desired = self.store.elements();
        let live_ids = self.live_ids();
        let eager_prefix = desired.iter().take_while(|id| id.is_resolved()).count();

        if self.config.sync_on_did_show && live_ids.len() < eager_prefix {
            tracing::debug!(
                path = desired.len(),
                live = live_ids.len(),
                "stack popped outside the path; truncating path"
            );
            self.write_back(live_ids);
            return;
        }

        if self.config.resolve_lazy_on_did_show {
            self.resolve_next(desired, live_ids.len());
        }
    }

    /// Resolve the element at `index`, right above the top screen.
    fn resolve_next(&self, mut desired: Vec<NavigationId>, index: usize) {
        let Some(id) = desired.get(index) else {
            return;
        };
        if id.is_resolved() {
            return;
        }
        let result = self.registry.borrow().resolve(id, index);
        match result {
            Ok(value) => {
                tracing::debug!(index, type_name = value.type_name(), "resolved next path element");
                desired[index] = NavigationId::Eager(value);
                self.store.set_elements(desired);
            }
            Err(issue) => {
                report_issue(issue);
                desired.truncate(index);
                self.write_back(desired);
            }
        }
    }

    fn dismiss_now(&self, screen: ScreenId) {
        if self.stopped.get() {
            report_issue(Issue::OutsideNavigationContext { action: "dismiss" });
            return;
        }
        let position = self
            .live()
            .iter()
            .filter(|(_, id)| id.is_some())
            .position(|(live, _)| *live == screen);
        let Some(index) = position else {
            report_issue(Issue::RedundantDismissal);
            return;
        };
        tracing::debug!(%screen, index, "dismissing screen");
        let mut path = self.store.elements();
        path.truncate(index);
        self.store.set_elements(path);
    }
}

impl<E> EventSink for Shared<E>
where
    E: StackExecutor + 'static,
    E::Screen: 'static,
{
    fn will_show(&self, screen: ScreenId, animated: bool) {
        self.queue_show(ShowEvent::Will(screen, animated));
    }

    fn did_show(&self, screen: ScreenId, animated: bool) {
        self.queue_show(ShowEvent::Did(screen, animated));
        if self.stopped.get()
            || !(self.config.sync_on_did_show || self.config.resolve_lazy_on_did_show)
        {
            return;
        }
        let version = self.store.version();
        let weak = self.this.clone();
        self.run_loop.schedule(move || {
            if let Some(shared) = weak.upgrade() {
                shared.after_did_show(version);
            }
        });
    }
}

impl<E> ContextHost for Shared<E>
where
    E: StackExecutor + 'static,
    E::Screen: 'static,
{
    fn dismiss(&self, screen: ScreenId) {
        let transaction = Transaction::current();
        let weak = self.this.clone();
        self.run_loop.schedule(move || {
            if let Some(shared) = weak.upgrade() {
                with_transaction(transaction, || shared.dismiss_now(screen));
            }
        });
    }

    fn push(&self, id: NavigationId) {
        if self.stopped.get() {
            report_issue(Issue::OutsideNavigationContext { action: "push" });
            return;
        }
        self.store.append(id);
    }

    fn is_presented(&self, screen: ScreenId) -> bool {
        !self.stopped.get() && self.ids.borrow().contains_key(&screen)
    }
}
