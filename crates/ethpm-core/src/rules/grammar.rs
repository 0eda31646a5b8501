//! Named string grammars.
//!
//! Each grammar is referenced from a rule set through the `format` keyword and
//! its name doubles as the `constraint_id` of the violation it produces.
//! Matchers are hand-written so that length limits and character classes are
//! exact and independent of any regex dialect.
//!
//! Lengths below are compatibility-bearing: published manifests and fixtures
//! depend on them.

/// Maximum length of a package name.
pub const PACKAGE_NAME_MAX_LEN: usize = 255;

/// Maximum length of contract names, aliases, instance names and identifiers.
pub const IDENTIFIER_MAX_LEN: usize = 256;

/// Maximum length of the bracketed suffix of a contract alias.
pub const ALIAS_SUFFIX_MAX_LEN: usize = 256;

/// Hex digits in an address (after `0x`).
pub const ADDRESS_HEX_LEN: usize = 40;

/// Hex digits in a transaction or block hash (after `0x`).
pub const HASH_HEX_LEN: usize = 64;

/// Hex digits in the genesis and block hashes embedded in a blockchain URI.
pub const URI_HASH_HEX_LEN: usize = 64;

pub const INSTALL_PATH_PREFIX: &str = "./";

pub const BLOCKCHAIN_URI_SCHEME: &str = "blockchain://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    PackageName,
    ContractAlias,
    ContractName,
    ContractInstanceName,
    NestedContractType,
    ContractTypeReference,
    BlockchainUri,
    ContentUri,
    Uri,
    InstallPath,
    ByteString,
    Address,
    TransactionHash,
    BlockHash,
    Identifier,
}

impl Grammar {
    pub const ALL: [Grammar; 15] = [
        Grammar::PackageName,
        Grammar::ContractAlias,
        Grammar::ContractName,
        Grammar::ContractInstanceName,
        Grammar::NestedContractType,
        Grammar::ContractTypeReference,
        Grammar::BlockchainUri,
        Grammar::ContentUri,
        Grammar::Uri,
        Grammar::InstallPath,
        Grammar::ByteString,
        Grammar::Address,
        Grammar::TransactionHash,
        Grammar::BlockHash,
        Grammar::Identifier,
    ];

    /// Look up a grammar by its `format` name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PackageName => "package-name",
            Self::ContractAlias => "contract-alias",
            Self::ContractName => "contract-name",
            Self::ContractInstanceName => "contract-instance-name",
            Self::NestedContractType => "nested-contract-type",
            Self::ContractTypeReference => "contract-type-reference",
            Self::BlockchainUri => "blockchain-uri",
            Self::ContentUri => "content-uri",
            Self::Uri => "uri",
            Self::InstallPath => "install-path",
            Self::ByteString => "byte-string",
            Self::Address => "address",
            Self::TransactionHash => "transaction-hash",
            Self::BlockHash => "block-hash",
            Self::Identifier => "identifier",
        }
    }

    /// Short description used in violation messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::PackageName => {
                "a package name (lowercase letters, digits and hyphens, starting with a letter, at most 255 characters)"
            }
            Self::ContractAlias => {
                "a contract alias (a contract name, optionally followed by a bracketed suffix)"
            }
            Self::ContractName => {
                "a contract name (letters, digits, `-` and `_`, starting with a letter, at most 256 characters)"
            }
            Self::ContractInstanceName => {
                "a contract instance name (letters, digits and `_`, starting with a letter, at most 256 characters)"
            }
            Self::NestedContractType => "a nested contract type (`<package>:<alias>`)",
            Self::ContractTypeReference => {
                "a contract type reference (a contract alias or `<package>:<contract>`)"
            }
            Self::BlockchainUri => "a blockchain URI (`blockchain://<genesis hash>/block/<block hash>`)",
            Self::ContentUri => "a content-addressed URI",
            Self::Uri => "an absolute URI",
            Self::InstallPath => "a relative install path starting with `./`",
            Self::ByteString => "a 0x-prefixed hex byte string",
            Self::Address => "a 0x-prefixed 40 hex digit address",
            Self::TransactionHash => "a 0x-prefixed 64 hex digit transaction hash",
            Self::BlockHash => "a 0x-prefixed 64 hex digit block hash",
            Self::Identifier => "an identifier (letters, digits and `_`, not starting with a digit)",
        }
    }

    pub fn matches(&self, s: &str) -> bool {
        match self {
            Self::PackageName => is_package_name(s),
            Self::ContractAlias => is_contract_alias(s),
            Self::ContractName => is_contract_name(s),
            Self::ContractInstanceName => is_contract_instance_name(s),
            Self::NestedContractType => is_nested_contract_type(s),
            Self::ContractTypeReference => is_contract_alias(s) || is_nested_contract_type(s),
            Self::BlockchainUri => BlockchainUri::parse(s).is_some(),
            Self::ContentUri => is_content_uri(s),
            Self::Uri => url::Url::parse(s).is_ok(),
            Self::InstallPath => s.starts_with(INSTALL_PATH_PREFIX),
            Self::ByteString => is_byte_string(s),
            Self::Address => is_prefixed_hex(s, ADDRESS_HEX_LEN),
            Self::TransactionHash | Self::BlockHash => is_prefixed_hex(s, HASH_HEX_LEN),
            Self::Identifier => is_identifier(s),
        }
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn is_package_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    s.len() <= PACKAGE_NAME_MAX_LEN
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn is_contract_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s.len() <= IDENTIFIER_MAX_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub fn is_contract_alias(s: &str) -> bool {
    match s.split_once('[') {
        None => is_contract_name(s),
        Some((base, rest)) => {
            let Some(suffix) = rest.strip_suffix(']') else {
                return false;
            };
            is_contract_name(base)
                && !suffix.is_empty()
                && suffix.len() <= ALIAS_SUFFIX_MAX_LEN
                && suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
    }
}

pub fn is_contract_instance_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    s.len() <= IDENTIFIER_MAX_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `(<package-name>:)+<contract-alias>`
pub fn is_nested_contract_type(s: &str) -> bool {
    let Some((namespaces, alias)) = s.rsplit_once(':') else {
        return false;
    };
    is_contract_alias(alias) && namespaces.split(':').all(is_package_name)
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s.len() <= IDENTIFIER_MAX_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_byte_string(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => hex.len() % 2 == 0 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_prefixed_hex(s: &str, len: usize) -> bool {
    s.strip_prefix("0x").is_some_and(|hex| is_hex_of_len(hex, len))
}

/// Absolute URI that names content: it must carry an authority or a path.
pub fn is_content_uri(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(u) => u.host_str().is_some_and(|h| !h.is_empty()) || !u.path().is_empty(),
        Err(_) => false,
    }
}

/// A parsed `blockchain://<genesis>/block/<block>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockchainUri<'a> {
    pub genesis_hash: &'a str,
    pub block_hash: &'a str,
}

impl<'a> BlockchainUri<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix(BLOCKCHAIN_URI_SCHEME)?;
        let (genesis_hash, block_hash) = rest.split_once("/block/")?;
        if !is_hex_of_len(genesis_hash, URI_HASH_HEX_LEN) || !is_hex_of_len(block_hash, URI_HASH_HEX_LEN) {
            return None;
        }
        Some(Self {
            genesis_hash,
            block_hash,
        })
    }
}
