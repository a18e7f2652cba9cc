use crate::config::SystemParams;
use crate::dlog::table::BabyStepMap;
use crate::error::PkeError;
use crate::group;
use ark_ec::CurveGroup;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_TARGET: &str = "elgamal::dlog::solver";

/// Shanks baby-step/giant-step solver for discrete logs in `[0, 2^L)`.
///
/// Given `M = m * base` with `m` in range, writes `m = j * N + i` where `i`
/// comes from the baby-step table and `j` from walking giant steps of
/// `N * base`. The table and giant point are read-only after construction,
/// so one solver can serve any number of threads.
pub struct ShanksSolver<C: CurveGroup> {
    base: C,
    giant: C,
    baby_steps: BabyStepMap,
    msg_bits: u32,
    baby_count: u64,
    giant_count: u64,
}

impl<C: CurveGroup> ShanksSolver<C> {
    pub fn new(base: C, params: &SystemParams, baby_steps: BabyStepMap) -> Self {
        let baby_count = params.baby_count();
        Self {
            base,
            giant: base * C::ScalarField::from(baby_count),
            baby_steps,
            msg_bits: params.msg_bits,
            baby_count,
            giant_count: params.giant_count(),
        }
    }

    /// The base point the solver (and its table) was built for.
    pub fn base(&self) -> C {
        self.base
    }

    /// `m = j * N + i`, guarding against indices a corrupt table could carry.
    fn compose(&self, j: u64, i: u64) -> Result<u64, PkeError> {
        let m = j.saturating_mul(self.baby_count).saturating_add(i);
        if m >> self.msg_bits != 0 {
            return Err(PkeError::Internal(
                "baby-step table produced an index outside the message range",
            ));
        }
        Ok(m)
    }

    /// Recover `m` from `target = m * base`, single-threaded.
    pub fn solve(&self, target: &C) -> Result<u64, PkeError> {
        let mut current = *target;
        for j in 0..self.giant_count {
            if let Some(&i) = self.baby_steps.get(group::point_to_bytes(&current).as_slice()) {
                return self.compose(j, i);
            }
            current -= self.giant;
        }
        tracing::debug!(target: LOG_TARGET, "giant-step range exhausted");
        Err(PkeError::NotFoundInRange(self.msg_bits))
    }

    /// Recover `m` from `target = m * base` with the giant-step range split
    /// across `threads` workers.
    ///
    /// Each worker pays one scalar multiplication to reach the start of its
    /// range, then walks by point subtraction. The first worker to find a
    /// match publishes `(j, i)` through a once-cell and raises the
    /// cancellation flag; since `m` is unique in range, the published pair
    /// is the same regardless of scheduling.
    pub fn solve_parallel(&self, target: &C, threads: usize) -> Result<u64, PkeError> {
        let threads = threads.max(1).min(self.giant_count as usize) as u64;
        if threads <= 1 {
            return self.solve(target);
        }
        let per_worker = self.giant_count / threads;

        let winner: OnceCell<(u64, u64)> = OnceCell::new();
        let cancelled = AtomicBool::new(false);
        std::thread::scope(|scope| {
            for worker in 0..threads {
                let start = worker * per_worker;
                let end = if worker == threads - 1 {
                    self.giant_count
                } else {
                    start + per_worker
                };
                let winner = &winner;
                let cancelled = &cancelled;
                let target = *target;
                scope.spawn(move || {
                    let mut current = target - self.giant * C::ScalarField::from(start);
                    for j in start..end {
                        if cancelled.load(Ordering::Acquire) {
                            return;
                        }
                        if let Some(&i) =
                            self.baby_steps.get(group::point_to_bytes(&current).as_slice())
                        {
                            let _ = winner.set((j, i));
                            cancelled.store(true, Ordering::Release);
                            return;
                        }
                        current -= self.giant;
                    }
                });
            }
        });

        match winner.get() {
            Some(&(j, i)) => self.compose(j, i),
            None => Err(PkeError::NotFoundInRange(self.msg_bits)),
        }
    }
}
