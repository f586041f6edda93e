/*!
 * Operation Registry
 * Static dispatch table describing every guarded operation
 */

/// Fixed creation mode for files (`open`, `write_file`, `append_file`).
pub const DEFAULT_FILE_MODE: u32 = 0o666;

/// Fixed creation mode for directories (`mkdir`).
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// Creation-mode rewrite applied to an operation after validation.
///
/// Sandboxed callers never choose creation permissions: a caller-supplied
/// mode is replaced with the fixed default so new filesystem entries always
/// come out with the same predictable bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRewrite {
    /// Force [`DEFAULT_FILE_MODE`].
    File,
    /// Force [`DEFAULT_DIR_MODE`].
    Dir,
}

impl ModeRewrite {
    /// The mode this rewrite forces.
    #[inline]
    #[must_use]
    pub const fn mode(self) -> u32 {
        match self {
            Self::File => DEFAULT_FILE_MODE,
            Self::Dir => DEFAULT_DIR_MODE,
        }
    }
}

/// Static description of one guarded operation.
///
/// One instance per supported operation, collected in [`REGISTRY`]; never
/// mutated at run time.
#[derive(Debug, Clone, Copy)]
pub struct OpSpec {
    pub name: &'static str,
    /// Path-argument positions validated against policy, in call order.
    pub guarded: &'static [usize],
    /// Creation-mode rewrite, for operations that create filesystem entries.
    pub rewrite: Option<ModeRewrite>,
}

impl OpSpec {
    /// The creation mode actually delegated: the forced default when this
    /// operation carries a rewrite, the requested mode otherwise.
    #[inline]
    pub fn effective_mode(&self, requested: u32) -> u32 {
        match self.rewrite {
            Some(rewrite) => rewrite.mode(),
            None => requested,
        }
    }
}

pub static APPEND_FILE: OpSpec = OpSpec {
    name: "append_file",
    guarded: &[0],
    rewrite: Some(ModeRewrite::File),
};

pub static EXISTS: OpSpec = OpSpec {
    name: "exists",
    guarded: &[0],
    rewrite: None,
};

pub static MKDIR: OpSpec = OpSpec {
    name: "mkdir",
    guarded: &[0],
    rewrite: Some(ModeRewrite::Dir),
};

pub static OPEN: OpSpec = OpSpec {
    name: "open",
    guarded: &[0],
    rewrite: Some(ModeRewrite::File),
};

pub static READDIR: OpSpec = OpSpec {
    name: "readdir",
    guarded: &[0],
    rewrite: None,
};

pub static READ_FILE: OpSpec = OpSpec {
    name: "read_file",
    guarded: &[0],
    rewrite: None,
};

pub static RENAME: OpSpec = OpSpec {
    name: "rename",
    guarded: &[0, 1],
    rewrite: None,
};

pub static RMDIR: OpSpec = OpSpec {
    name: "rmdir",
    guarded: &[0],
    rewrite: None,
};

pub static STAT: OpSpec = OpSpec {
    name: "stat",
    guarded: &[0],
    rewrite: None,
};

pub static UNLINK: OpSpec = OpSpec {
    name: "unlink",
    guarded: &[0],
    rewrite: None,
};

pub static WRITE_FILE: OpSpec = OpSpec {
    name: "write_file",
    guarded: &[0],
    rewrite: Some(ModeRewrite::File),
};

/// Every guarded operation, in name order.
pub static REGISTRY: &[&OpSpec] = &[
    &APPEND_FILE,
    &EXISTS,
    &MKDIR,
    &OPEN,
    &READ_FILE,
    &READDIR,
    &RENAME,
    &RMDIR,
    &STAT,
    &UNLINK,
    &WRITE_FILE,
];

/// Look up an operation spec by name.
pub fn lookup(name: &str) -> Option<&'static OpSpec> {
    REGISTRY.iter().copied().find(|spec| spec.name == name)
}
