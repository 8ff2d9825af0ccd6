//! Generated icall table headers
//!
//! The build tool that assigns tokens emits a C header holding, per
//! assembly, three parallel arrays plus a prototype for every native:
//!
//! ```text
//! #define ICALL_TABLE_corlib 1
//!
//! static int corlib_icall_indexes [] = {
//! 216,
//! 231,
//! };
//! void ves_icall_System_Array_InternalCreate (int,int,int,int,int);
//! int ves_icall_System_Array_GetLengthInternal_raw (int,int,int);
//! static void *corlib_icall_funcs [] = {
//! // token 216,
//! ves_icall_System_Array_InternalCreate,
//! // token 231,
//! ves_icall_System_Array_GetLengthInternal_raw,
//! };
//! static uint8_t corlib_icall_flags [] = {
//! 0,
//! 4,
//! };
//! ```
//!
//! [`TableManifest::parse`] reads that layout back into one structured entry
//! per token so it can be validated and linked against a symbol catalog.

use std::path::Path;

use icall_sdk::{CallConvention, ReturnKind, ScalarKind, Signature};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::error::BuildError;
use crate::table::first_unsorted;

static DEFINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#define\s+ICALL_TABLE_(\w+)\s+1$").unwrap());
static ARRAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^static\s+(?:int|void\s*\*|uint8_t)\s*(\w+?)_icall_(indexes|funcs|flags)\s*\[\]\s*=\s*\{$")
        .unwrap()
});
static PROTO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(void|int|int64_t|double)\s+(\w+)\s*\(([^)]*)\);$").unwrap()
});
static TOKEN_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^//\s*token\s+(\d+),?$").unwrap());
static ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+),?$").unwrap());

/// Errors that can occur while reading a generated header
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read header file
    #[error("Failed to read table header: {0}")]
    IoError(#[from] std::io::Error),

    /// Line does not fit the current array
    #[error("line {line}: unexpected `{text}`")]
    UnexpectedLine {
        /// 1-based line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// Prototype names a type the dispatch table cannot marshal
    #[error("line {line}: unsupported prototype type `{ty}`")]
    UnknownType {
        /// 1-based line number
        line: usize,
        /// Type name
        ty: String,
    },

    /// Assembly declared without one of its arrays
    #[error("assembly `{assembly}` has no `{array}` array")]
    MissingArray {
        /// Assembly name
        assembly: String,
        /// Array kind (indexes / funcs / flags)
        array: &'static str,
    },

    /// Header ended inside an array
    #[error("assembly `{assembly}`: `{array}` array is not terminated")]
    Unterminated {
        /// Assembly name
        assembly: String,
        /// Array kind
        array: &'static str,
    },

    /// Parallel arrays differ in length
    #[error("assembly `{assembly}`: {indexes} indexes, {funcs} funcs, {flags} flags")]
    LengthMismatch {
        /// Assembly name
        assembly: String,
        /// Index array length
        indexes: usize,
        /// Function array length
        funcs: usize,
        /// Flag array length
        flags: usize,
    },

    /// `// token N` comment disagrees with the index array
    #[error("assembly `{assembly}` entry {index}: comment says token {comment}, index array says {token}")]
    TokenCommentMismatch {
        /// Assembly name
        assembly: String,
        /// Position in the arrays
        index: usize,
        /// Token from the comment
        comment: u32,
        /// Token from the index array
        token: u32,
    },
}

/// One native as described by the generated header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Assigned token
    pub token: u32,
    /// Native symbol name
    pub symbol: String,
    /// Prototype, if the header declared one
    pub signature: Option<Signature>,
    /// Raw flag byte
    pub flags: u8,
}

impl ManifestEntry {
    /// Calling convention, or `None` for an unrecognized flag byte
    pub fn convention(&self) -> Option<CallConvention> {
        CallConvention::try_from(self.flags).ok()
    }
}

/// The icall table of one assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyTable {
    /// Assembly name (e.g., "corlib")
    pub name: String,
    /// Entries in header order
    pub entries: Vec<ManifestEntry>,
}

impl AssemblyTable {
    /// Apply the entry store's ordering and flag rules without binding natives
    pub fn validate(&self) -> Result<(), BuildError> {
        if let Some((index, previous, token)) = first_unsorted(self.entries.iter().map(|e| e.token))
        {
            return Err(BuildError::Unsorted {
                index,
                previous,
                token,
            });
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.convention().is_none() {
                return Err(BuildError::UnknownFlag {
                    index,
                    token: entry.token,
                    flags: entry.flags,
                });
            }
        }
        Ok(())
    }

    /// Find an entry by token (table must be sorted)
    pub fn lookup(&self, token: u32) -> Option<&ManifestEntry> {
        self.entries
            .binary_search_by_key(&token, |e| e.token)
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every assembly table found in one header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableManifest {
    /// Tables in header order
    pub tables: Vec<AssemblyTable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Array {
    Indexes,
    Funcs,
    Flags,
}

impl Array {
    fn name(self) -> &'static str {
        match self {
            Array::Indexes => "indexes",
            Array::Funcs => "funcs",
            Array::Flags => "flags",
        }
    }
}

#[derive(Default)]
struct PendingTable {
    name: String,
    indexes: Option<Vec<u32>>,
    funcs: Option<Vec<(Option<u32>, String)>>,
    flags: Option<Vec<u8>>,
}

impl TableManifest {
    /// Read a header from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse header text
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let mut pending: Vec<PendingTable> = Vec::new();
        let mut prototypes: FxHashMap<String, Signature> = FxHashMap::default();
        let mut open: Option<(usize, Array)> = None;
        let mut comment_token: Option<u32> = None;

        for (i, raw_line) in content.lines().enumerate() {
            let line_no = i + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some((table, array)) = open {
                if line == "};" {
                    open = None;
                    comment_token = None;
                    continue;
                }
                let table = &mut pending[table];
                match array {
                    Array::Indexes => {
                        let token: u32 = parse_item(line, line_no)?;
                        table.indexes.get_or_insert_with(Vec::new).push(token);
                    }
                    Array::Flags => {
                        let flags: u8 = parse_item(line, line_no)?;
                        table.flags.get_or_insert_with(Vec::new).push(flags);
                    }
                    Array::Funcs => {
                        if let Some(caps) = TOKEN_COMMENT_RE.captures(line) {
                            comment_token = Some(parse_number(&caps[1], line, line_no)?);
                        } else if let Some(caps) = ITEM_RE.captures(line) {
                            let symbol = caps[1].to_string();
                            table
                                .funcs
                                .get_or_insert_with(Vec::new)
                                .push((comment_token.take(), symbol));
                        } else {
                            return Err(unexpected(line, line_no));
                        }
                    }
                }
                continue;
            }

            if let Some(caps) = DEFINE_RE.captures(line) {
                table_index(&mut pending, &caps[1]);
            } else if let Some(caps) = ARRAY_RE.captures(line) {
                let table = table_index(&mut pending, &caps[1]);
                let array = match &caps[2] {
                    "indexes" => Array::Indexes,
                    "funcs" => Array::Funcs,
                    _ => Array::Flags,
                };
                let slot_taken = match array {
                    Array::Indexes => pending[table].indexes.replace(Vec::new()).is_some(),
                    Array::Funcs => pending[table].funcs.replace(Vec::new()).is_some(),
                    Array::Flags => pending[table].flags.replace(Vec::new()).is_some(),
                };
                if slot_taken {
                    return Err(unexpected(line, line_no));
                }
                open = Some((table, array));
            } else if let Some(caps) = PROTO_RE.captures(line) {
                let signature = parse_prototype(&caps[1], &caps[3], line_no)?;
                prototypes.insert(caps[2].to_string(), signature);
            } else if line.starts_with("//") || line.starts_with('#') {
                // Comments and unrelated preprocessor lines.
            } else {
                return Err(unexpected(line, line_no));
            }
        }

        if let Some((table, array)) = open {
            return Err(ManifestError::Unterminated {
                assembly: pending[table].name.clone(),
                array: array.name(),
            });
        }

        let tables = pending
            .into_iter()
            .map(|table| finish_table(table, &prototypes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tables })
    }

    /// Table for an assembly
    pub fn table(&self, name: &str) -> Option<&AssemblyTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Total entries across all assemblies
    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(AssemblyTable::len).sum()
    }
}

fn table_index(pending: &mut Vec<PendingTable>, name: &str) -> usize {
    if let Some(index) = pending.iter().position(|t| t.name == name) {
        return index;
    }
    pending.push(PendingTable {
        name: name.to_string(),
        ..Default::default()
    });
    pending.len() - 1
}

fn unexpected(line: &str, line_no: usize) -> ManifestError {
    ManifestError::UnexpectedLine {
        line: line_no,
        text: line.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(text: &str, line: &str, line_no: usize) -> Result<T, ManifestError> {
    text.parse().map_err(|_| unexpected(line, line_no))
}

fn parse_item<T: std::str::FromStr>(line: &str, line_no: usize) -> Result<T, ManifestError> {
    let caps = ITEM_RE
        .captures(line)
        .ok_or_else(|| unexpected(line, line_no))?;
    parse_number(&caps[1], line, line_no)
}

fn parse_prototype(ret: &str, params: &str, line_no: usize) -> Result<Signature, ManifestError> {
    let ret = match ret {
        "void" => ReturnKind::Void,
        other => ReturnKind::Scalar(scalar_kind(other, line_no)?),
    };
    let params = params
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && *p != "void")
        .map(|p| scalar_kind(p, line_no))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Signature::new(params, ret))
}

fn scalar_kind(ty: &str, line_no: usize) -> Result<ScalarKind, ManifestError> {
    ScalarKind::from_c_name(ty).ok_or_else(|| ManifestError::UnknownType {
        line: line_no,
        ty: ty.to_string(),
    })
}

fn finish_table(
    table: PendingTable,
    prototypes: &FxHashMap<String, Signature>,
) -> Result<AssemblyTable, ManifestError> {
    let PendingTable {
        name,
        indexes,
        funcs,
        flags,
    } = table;
    let missing = |array| ManifestError::MissingArray {
        assembly: name.clone(),
        array,
    };
    let indexes = indexes.ok_or_else(|| missing("indexes"))?;
    let funcs = funcs.ok_or_else(|| missing("funcs"))?;
    let flags = flags.ok_or_else(|| missing("flags"))?;

    if indexes.len() != funcs.len() || indexes.len() != flags.len() {
        return Err(ManifestError::LengthMismatch {
            assembly: name,
            indexes: indexes.len(),
            funcs: funcs.len(),
            flags: flags.len(),
        });
    }

    let mut entries = Vec::with_capacity(indexes.len());
    for (index, ((token, (comment, symbol)), flags)) in
        indexes.into_iter().zip(funcs).zip(flags).enumerate()
    {
        if let Some(comment) = comment {
            if comment != token {
                return Err(ManifestError::TokenCommentMismatch {
                    assembly: name,
                    index,
                    comment,
                    token,
                });
            }
        }
        let signature = prototypes.get(&symbol).cloned();
        entries.push(ManifestEntry {
            token,
            symbol,
            signature,
            flags,
        });
    }

    Ok(AssemblyTable { name, entries })
}
