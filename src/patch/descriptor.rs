//! Typed patch descriptor model.
//!
//! Descriptors arrive as a JSON document of the form
//! `{ "patches": [ ... ] }`, with each entry tagged `"type": "dex"` or
//! `"type": "native"`. Deserialization is the validation boundary: a document
//! that parses yields only well-formed descriptors, and nothing touches a
//! file before that point. Unknown operation tags are preserved as
//! [`PatchOp::Unknown`] so a single stale descriptor is skipped with a
//! reported reason instead of failing the whole document.

use serde::Deserialize;

/// Default native target inside the package when a descriptor omits it.
pub const DEFAULT_NATIVE_TARGET: &str = "lib/arm64-v8a/libil2cpp.so";

/// The operation a descriptor applies at its resolved location.
///
/// The same three semantic operations exist for both artifact kinds; the
/// byte template differs (Dalvik units for bytecode, AArch64 words for
/// native code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchOp {
    /// Return immediately with no value.
    ReturnVoid,
    /// Load immediate 1 into the return register, then return.
    ReturnTrue,
    /// Load immediate 0 into the return register, then return.
    ReturnFalse,
    /// An operation tag this build does not know. Skipped at apply time.
    #[serde(other)]
    Unknown,
}

impl PatchOp {
    /// Dalvik instruction stub overwriting the start of a method body.
    ///
    /// `return-void` is `0e 00`; the boolean variants are `const/4 v0, #1|#0`
    /// (`12 10` / `12 00`) followed by `return v0` (`0f 00`).
    #[must_use]
    pub fn dalvik_stub(self) -> Option<&'static [u8]> {
        match self {
            PatchOp::ReturnVoid => Some(&[0x0E, 0x00]),
            PatchOp::ReturnTrue => Some(&[0x12, 0x10, 0x0F, 0x00]),
            PatchOp::ReturnFalse => Some(&[0x12, 0x00, 0x0F, 0x00]),
            PatchOp::Unknown => None,
        }
    }
}

/// One patch to apply to one artifact inside the package.
///
/// Internally tagged on `"type"`, matching the wire format patch documents
/// use. Exactly one target artifact per descriptor; a native descriptor with
/// several `offsets` fans the same template out to every address.
///
/// # Examples
///
/// ```rust
/// use apkpatch::patch::{PatchDescriptor, PatchOp};
///
/// let json = r#"{
///     "name": "disable-verify",
///     "type": "dex",
///     "dexFile": "classes11.dex",
///     "className": "Lcom/app/SignatureCheck;",
///     "methodName": "verifyIntegrity",
///     "patch": "return_void"
/// }"#;
/// let descriptor: PatchDescriptor = serde_json::from_str(json)?;
/// assert_eq!(descriptor.name(), "disable-verify");
/// assert_eq!(descriptor.operation(), PatchOp::ReturnVoid);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum PatchDescriptor {
    /// Rewrite the body of one method inside a DEX entry.
    #[serde(rename = "dex", rename_all = "camelCase")]
    Dex {
        /// Human-readable patch name, used in the run report.
        name: String,
        /// Optional free-form description.
        #[serde(default)]
        description: String,
        /// Container entry holding the image, e.g. `classes11.dex`.
        dex_file: String,
        /// Type descriptor in `Lcom/app/Foo;` form.
        class_name: String,
        /// Plain method name; first declaration-order match wins.
        method_name: String,
        /// Operation to stub the method body with.
        patch: PatchOp,
    },

    /// Overwrite fixed-width instructions at absolute offsets in a native image.
    #[serde(rename = "native", rename_all = "camelCase")]
    Native {
        /// Human-readable patch name, used in the run report.
        name: String,
        /// Optional free-form description.
        #[serde(default)]
        description: String,
        /// Container entry holding the image.
        #[serde(default = "default_native_target")]
        target_file: String,
        /// File-relative hexadecimal addresses, `0x`-prefixed or bare.
        offsets: Vec<String>,
        /// Operation template written at every offset.
        patch: PatchOp,
    },
}

fn default_native_target() -> String {
    DEFAULT_NATIVE_TARGET.to_string()
}

impl PatchDescriptor {
    /// The descriptor's report name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            PatchDescriptor::Dex { name, .. } | PatchDescriptor::Native { name, .. } => name,
        }
    }

    /// The operation this descriptor applies.
    #[must_use]
    pub fn operation(&self) -> PatchOp {
        match self {
            PatchDescriptor::Dex { patch, .. } | PatchDescriptor::Native { patch, .. } => *patch,
        }
    }

    /// Path of the container entry this descriptor targets.
    #[must_use]
    pub fn target_entry(&self) -> &str {
        match self {
            PatchDescriptor::Dex { dex_file, .. } => dex_file,
            PatchDescriptor::Native { target_file, .. } => target_file,
        }
    }
}

/// A fetched patch document: the ordered descriptor list for one app version.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchSet {
    /// Descriptors in application order.
    #[serde(default)]
    pub patches: Vec<PatchDescriptor>,
}
