use serde_json::Value;

/// Live, non-serializable object owned by the 3D engine for one rendered
/// feature.
///
/// This is the only surface the state layer relies on: explicit disposal
/// (engine handles can hold native/GPU resources, so teardown must not
/// depend on drop order) and name-based reads of the plain fields the
/// extraction adapter is allowed to copy out. Engine internals are never
/// traversed directly.
pub trait EngineHandle: std::fmt::Debug {
    /// Releases the engine-side resources behind this handle.
    ///
    /// Must be idempotent: the registry may call it again during teardown
    /// of a record that was already disposed.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    /// Reads one whitelisted field as a plain JSON value, or `None` if the
    /// engine cannot represent it as plain data.
    fn plain_field(&self, name: &str) -> Option<Value>;
}
