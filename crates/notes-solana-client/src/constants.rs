//! Constants shared between the on-chain program and clients.
//!
//! Keep these stable because they affect PDA derivation and wire encoding.

/// PDA seed prefix for note accounts.
pub const SEED_NOTE: &[u8] = b"note";

/// Anchor namespace for instruction discriminators.
pub const IX_NAMESPACE: &str = "global";

/// Anchor namespace for account discriminators.
pub const ACCOUNT_NAMESPACE: &str = "account";

/// Length of an Anchor discriminator, which also is the account header size.
pub const DISCRIMINATOR_LEN: usize = 8;

/// First code of program-defined errors.
pub const ERROR_CODE_OFFSET: u32 = 6000;
