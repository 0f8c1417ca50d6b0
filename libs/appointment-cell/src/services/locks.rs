// libs/appointment-cell/src/services/locks.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

/// Per-doctor booking locks. The conflict check and the write that follows it
/// run inside one doctor's critical section, so two concurrent bookings for
/// the same doctor cannot both pass validation before either persists.
/// Bookings for different doctors never contend.
pub struct DoctorScheduleLocks {
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl DoctorScheduleLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take the lock for one doctor, creating it on first use. The guard is
    /// owned so it can be held across the store round-trips.
    pub async fn acquire(&self, doctor_id: Uuid) -> OwnedMutexGuard<()> {
        let doctor_lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(doctor_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        doctor_lock.lock_owned().await
    }
}

impl Default for DoctorScheduleLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn bookings_for_one_doctor_are_serialized() {
        let locks = Arc::new(DoctorScheduleLocks::new());
        let doctor_id = Uuid::new_v4();
        let in_critical_section = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let in_critical_section = in_critical_section.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(doctor_id).await;
                let others = in_critical_section.fetch_add(1, Ordering::SeqCst);
                assert_eq!(others, 0);
                tokio::task::yield_now().await;
                in_critical_section.fetch_sub(1, Ordering::SeqCst);
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_doctors_do_not_contend() {
        let locks = DoctorScheduleLocks::new();

        let first = locks.acquire(Uuid::new_v4()).await;
        let _second = locks.acquire(Uuid::new_v4()).await;
        drop(first);
    }

    #[tokio::test]
    async fn lock_is_reusable_after_release() {
        let locks = DoctorScheduleLocks::new();
        let doctor_id = Uuid::new_v4();

        drop(locks.acquire(doctor_id).await);
        let _again = locks.acquire(doctor_id).await;
    }
}
