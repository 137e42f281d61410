use crate::debug_log;
use crate::jdwp::FieldBreakpoint;
use crate::rt::field::stable::{StableBoolean, StableSnapshot};
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt::Display;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A field is watched by at most one access and one modification breakpoint.
pub const MAX_FIELD_BREAKPOINTS: usize = 2;

/// Debugger watchpoints of one field.
///
/// The interpreter only ever asks [`BreakpointRegistry::is_active`], which is
/// a single load of a stable flag. The list itself is touched only by the
/// debugger.
#[derive(Debug)]
pub struct BreakpointRegistry {
    infos: Mutex<SmallVec<[FieldBreakpoint; MAX_FIELD_BREAKPOINTS]>>,
    active: StableBoolean,
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self {
            infos: Mutex::new(SmallVec::new()),
            active: StableBoolean::new("field breakpoint active", false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SmallVec<[FieldBreakpoint; MAX_FIELD_BREAKPOINTS]>> {
        self.infos.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn speculate_active(&self) -> StableSnapshot {
        self.active.speculate()
    }

    pub fn active_flag(&self) -> &StableBoolean {
        &self.active
    }

    pub fn infos(&self) -> Vec<FieldBreakpoint> {
        self.lock().to_vec()
    }

    pub fn add(&self, info: FieldBreakpoint) {
        let mut infos = self.lock();
        debug_assert!(
            infos.len() < MAX_FIELD_BREAKPOINTS,
            "field already has {} breakpoints",
            infos.len()
        );
        debug_assert!(
            infos.iter().all(|it| it.request_id != info.request_id),
            "duplicate breakpoint request id {}",
            info.request_id
        );
        infos.push(info);
        self.active.set(true);
        debug_log!(
            "Field breakpoints: [{}]",
            infos.iter().map(|it| it.request_id).join(", ")
        );
    }

    /// Removes the breakpoint with `request_id`.
    ///
    /// A sole breakpoint is removed whatever its id. With two breakpoints an
    /// unknown id is ignored. Removing from a field without breakpoints is a
    /// debugger bug and panics, naming `owner`.
    pub fn remove(&self, request_id: i32, owner: &dyn Display) {
        let mut infos = self.lock();
        match infos.len() {
            0 => panic!("Field: {} should contain field breakpoint info", owner),
            1 => {
                infos.clear();
                self.active.set(false);
            }
            _ => {
                if let Some(pos) = infos.iter().position(|it| it.request_id == request_id) {
                    infos.remove(pos);
                }
            }
        }
        debug_log!(
            "Field {} breakpoints after removing {}: [{}]",
            owner,
            request_id,
            infos.iter().map(|it| it.request_id).join(", ")
        );
    }
}

impl Default for BreakpointRegistry {
    fn default() -> Self {
        Self::new()
    }
}
