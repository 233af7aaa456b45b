//! Warm instance pool of a single function.

/// One simulated warm execution slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatedInstance {
    /// End of the last invocation served by the instance.
    pub last_end_time: f64,
    /// Time after which the instance can no longer be reused.
    pub expiry_time: f64,
}

impl SimulatedInstance {
    pub fn new(last_end_time: f64, expiry_time: f64) -> Self {
        Self {
            last_end_time,
            expiry_time,
        }
    }

    /// Idle and not yet expired, both bounds exclusive.
    pub fn is_idle_at(&self, time: f64) -> bool {
        time > self.last_end_time && time < self.expiry_time
    }

    /// Not yet expired, bound inclusive. Ignores whether the instance is still busy.
    pub fn is_alive_at(&self, time: f64) -> bool {
        time <= self.expiry_time
    }

    pub fn is_expired_at(&self, time: f64) -> bool {
        self.expiry_time < time
    }
}

/// Active instances of one function, in creation order.
///
/// All scans go from the most recently created instance backwards. Removal uses `Vec::remove`, which
/// keeps the relative order of the remaining instances and never moves an unvisited (lower index) one.
#[derive(Clone, Debug, Default)]
pub struct WarmPool {
    instances: Vec<SimulatedInstance>,
}

impl WarmPool {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &[SimulatedInstance] {
        &self.instances
    }

    pub fn add(&mut self, instance: SimulatedInstance) {
        self.instances.push(instance);
    }

    /// Returns the newest instance that is idle at `time`.
    pub fn find_idle_mut(&mut self, time: f64) -> Option<&mut SimulatedInstance> {
        self.instances.iter_mut().rev().find(|instance| instance.is_idle_at(time))
    }

    /// Returns the newest instance alive at `time`. Expired instances met before the match are removed
    /// on the way, the ones below the match are left untouched.
    pub fn find_alive_evicting_mut(&mut self, time: f64) -> Option<&mut SimulatedInstance> {
        let mut j = self.instances.len();
        while j > 0 {
            j -= 1;
            if self.instances[j].is_alive_at(time) {
                return Some(&mut self.instances[j]);
            }
            self.instances.remove(j);
        }
        None
    }

    /// Removes every instance that expired strictly before `time`.
    pub fn evict_expired(&mut self, time: f64) {
        self.instances.retain(|instance| !instance.is_expired_at(time));
    }
}
