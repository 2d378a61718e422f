//! Human readable names bound to an address
//!
//! A registration carries no signature. An update is authorized by the owner of the address
//! the alias is currently bound to, signing the entry without its signature.

use serde::{Deserialize, Serialize};

use crypto::{
    cn_fast_hash,
    signature::{check_signature, generate_signature},
    Hash256, KeyPair, PublicKey, SecretKey, Signature,
};
use ensure_macro::ensure;

use crate::{
    codec::{DecodeError, DecodeResult, Reader},
    constants::MAX_ALIAS_LEN,
    extra::TX_EXTRA_TAG_ALIAS,
    Address, Decode, Encode, Error, Result,
};

/// Characters an alias may be made of
pub const VALID_ALIAS_CHARS: &str = "0123456789abcdefghijklmnopqrstuvwxyz-.";

const FLAG_VIEW_KEY: u8 = 0x01;
const FLAG_SIGNATURE: u8 = 0x02;

/// An alias registration or update record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasInfo {
    pub alias: String,
    /// Address the alias resolves to
    pub address: Address,
    /// View secret key disclosed along with the binding
    pub view_key: Option<SecretKey>,
    pub comment: String,
    /// Present on updates only
    pub signature: Option<Signature>,
}

/// Checks the length and character set of an alias
pub fn validate_alias_name(alias: &str) -> bool {
    !alias.is_empty()
        && alias.len() <= MAX_ALIAS_LEN
        && alias.chars().all(|c| VALID_ALIAS_CHARS.contains(c))
}

impl AliasInfo {
    pub fn new(alias: String, address: Address, comment: String) -> Self {
        AliasInfo {
            alias,
            address,
            view_key: None,
            comment,
            signature: None,
        }
    }

    pub fn is_update(&self) -> bool {
        self.signature.is_some()
    }

    /// Checks the name and the comment length
    pub fn validate(&self) -> Result<()> {
        ensure!(
            validate_alias_name(&self.alias),
            Error::InvalidAlias(self.alias.clone())
        );
        ensure!(
            self.comment.len() <= usize::from(u8::max_value()),
            Error::AliasCommentTooLong(self.comment.len())
        );
        Ok(())
    }

    /// Serializes the record as an extra field, tag included
    ///
    /// With `for_signing` set, the signature is left out, giving the pre-image signed by
    /// `sign_update`
    pub fn make_tx_extra_alias_entry(&self, for_signing: bool) -> Result<Vec<u8>> {
        self.validate()?;
        let mut entry = vec![TX_EXTRA_TAG_ALIAS];
        self.write_entry(&mut entry, for_signing);
        Ok(entry)
    }

    fn signing_hash(&self) -> Result<Hash256> {
        Ok(cn_fast_hash(&self.make_tx_extra_alias_entry(true)?))
    }

    /// Signs the record with the keys of the address currently owning the alias
    pub fn sign_update(&mut self, owner_keys: &KeyPair) -> Result<()> {
        let hash = self.signing_hash()?;
        self.signature = Some(generate_signature(
            &hash,
            &owner_keys.public_key,
            &owner_keys.secret_key,
        ));
        Ok(())
    }

    /// Verifies the update signature against the spend key of the current owner
    pub fn check_update_signature(&self, owner_spend_key: &PublicKey) -> Result<()> {
        let signature = self.signature.ok_or(Error::InvalidAliasSignature)?;
        ensure!(
            check_signature(&self.signing_hash()?, owner_spend_key, &signature),
            Error::InvalidAliasSignature
        );
        Ok(())
    }

    fn flags(&self, for_signing: bool) -> u8 {
        let mut flags = 0;
        if self.view_key.is_some() {
            flags |= FLAG_VIEW_KEY;
        }
        if self.signature.is_some() && !for_signing {
            flags |= FLAG_SIGNATURE;
        }
        flags
    }

    /// Lengths are written as single bytes, so the record must have passed `validate`
    pub(crate) fn write_entry(&self, out: &mut Vec<u8>, for_signing: bool) {
        out.push(self.alias.len() as u8);
        out.push(self.flags(for_signing));
        out.extend_from_slice(self.alias.as_bytes());
        self.address.encode(out);
        if let Some(view_key) = &self.view_key {
            out.extend_from_slice(view_key.as_bytes());
        }
        out.push(self.comment.len() as u8);
        out.extend_from_slice(self.comment.as_bytes());
        if let (Some(signature), false) = (&self.signature, for_signing) {
            signature.encode(out);
        }
    }
}

fn read_text(reader: &mut Reader<'_>, length: usize) -> DecodeResult<String> {
    String::from_utf8(reader.read_bytes(length)?.to_vec()).map_err(|_| DecodeError::InvalidText)
}

/// Reads a record written by `write_entry`, tag excluded
impl Decode for AliasInfo {
    fn decode(reader: &mut Reader<'_>) -> DecodeResult<Self> {
        let alias_length = usize::from(reader.read_u8()?);
        let flags = reader.read_u8()?;
        ensure!(
            flags & !(FLAG_VIEW_KEY | FLAG_SIGNATURE) == 0,
            DecodeError::UnknownTag {
                kind: "alias flags",
                tag: flags,
            }
        );
        let alias = read_text(reader, alias_length)?;
        let address = Address::decode(reader)?;
        let view_key = if flags & FLAG_VIEW_KEY != 0 {
            Some(
                crypto::keys::secret_key_from_bytes(reader.read_32()?)
                    .ok_or(DecodeError::NonCanonicalScalar)?,
            )
        } else {
            None
        };
        let comment_length = usize::from(reader.read_u8()?);
        let comment = read_text(reader, comment_length)?;
        let signature = if flags & FLAG_SIGNATURE != 0 {
            Some(Signature::decode(reader)?)
        } else {
            None
        };

        Ok(AliasInfo {
            alias,
            address,
            view_key,
            comment,
            signature,
        })
    }
}
