//! Row layout and codec.
//!
//! A row is a fixed-width record `{id: u32, username: bytes[33],
//! email: bytes[256]}` serialized at well-known offsets. The codec is
//! hand-rolled offset copying rather than a generic derive: the on-disk
//! format (see `table`) is an exact byte layout, and a length-prefixed or
//! tagged encoding would not reproduce it.

/// Maximum number of bytes the username may occupy, not counting the
/// trailing NUL.
pub const COLUMN_USERNAME_SIZE: usize = 32;
/// Maximum number of bytes the email may occupy, not counting the
/// trailing NUL.
pub const COLUMN_EMAIL_SIZE: usize = 255;

const ID_SIZE: usize = std::mem::size_of::<u32>();
const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

/// Total serialized width of a row: `4 + 33 + 256 = 293` bytes.
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// A single table row, already validated by the dispatcher (id in
/// range, username/email within their size limits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: [u8; USERNAME_SIZE],
    pub email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Builds a row from already-validated text fields, NUL-padding the
    /// username/email buffers.
    pub fn new(id: u32, username: &str, email: &str) -> Self {
        let mut row = Row {
            id,
            username: [0u8; USERNAME_SIZE],
            email: [0u8; EMAIL_SIZE],
        };
        let ub = username.as_bytes();
        row.username[..ub.len()].copy_from_slice(ub);
        let eb = email.as_bytes();
        row.email[..eb.len()].copy_from_slice(eb);
        row
    }

    pub fn username_str(&self) -> String {
        fixed_bytes_to_string(&self.username)
    }

    pub fn email_str(&self) -> String {
        fixed_bytes_to_string(&self.email)
    }
}

fn fixed_bytes_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Copies `row` into `dst` at the fixed offsets above. `dst` must be
/// exactly `ROW_SIZE` bytes.
pub fn serialize(row: &Row, dst: &mut [u8]) {
    debug_assert_eq!(dst.len(), ROW_SIZE);
    dst[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&row.id.to_le_bytes());
    dst[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&row.username);
    dst[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&row.email);
}

/// Reads a row back out of a `ROW_SIZE`-byte slice.
pub fn deserialize(src: &[u8]) -> Row {
    debug_assert_eq!(src.len(), ROW_SIZE);
    let mut id_bytes = [0u8; ID_SIZE];
    id_bytes.copy_from_slice(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]);

    let mut username = [0u8; USERNAME_SIZE];
    username.copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);

    let mut email = [0u8; EMAIL_SIZE];
    email.copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);

    Row {
        id: u32::from_le_bytes(id_bytes),
        username,
        email,
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username_str(), self.email_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_size_matches_spec() {
        assert_eq!(ROW_SIZE, 293);
        assert_eq!(ID_OFFSET, 0);
        assert_eq!(USERNAME_OFFSET, 4);
        assert_eq!(EMAIL_OFFSET, 37);
    }

    #[test]
    fn round_trips_through_the_fixed_layout() {
        let row = Row::new(42, "alice", "alice@example.com");
        let mut buf = [0u8; ROW_SIZE];
        serialize(&row, &mut buf);
        let back = deserialize(&buf);
        assert_eq!(back.id, 42);
        assert_eq!(back.username_str(), "alice");
        assert_eq!(back.email_str(), "alice@example.com");
    }

    #[test]
    fn max_length_fields_fill_without_overrun() {
        let username = "a".repeat(COLUMN_USERNAME_SIZE);
        let email = "b".repeat(COLUMN_EMAIL_SIZE);
        let row = Row::new(1, &username, &email);
        assert_eq!(row.username_str(), username);
        assert_eq!(row.email_str(), email);
    }
}
