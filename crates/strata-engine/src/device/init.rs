/// Initialization parameters for the headless wgpu device.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter power preference.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features.
    ///
    /// Geometry buffers need none; keep this empty for portability.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Upper bound on live geometry buffer bytes.
    ///
    /// wgpu does not report memory pressure synchronously, so the budget is
    /// what turns "too much geometry" into an out-of-memory error the cache
    /// can react to. `None` disables the check.
    pub memory_budget: Option<u64>,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            memory_budget: None,
        }
    }
}
