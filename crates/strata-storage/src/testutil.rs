//! Shared fixtures for unit tests.

use strata_common::{pack_str, Record};

/// A 64-byte person record with fixed-width name and address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TestRecord {
    pub id: i32,
    pub name: [u8; 28],
    pub address: [u8; 28],
    pub age: i32,
}

impl TestRecord {
    pub fn new(id: i32, name: &str, address: &str, age: i32) -> Self {
        let mut packed_name = [0u8; 28];
        let mut packed_address = [0u8; 28];
        pack_str(&mut packed_name, name);
        pack_str(&mut packed_address, address);
        Self {
            id,
            name: packed_name,
            address: packed_address,
            age,
        }
    }
}

impl Record for TestRecord {
    const SIZE: usize = 64;

    fn encode(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.id.to_le_bytes());
        buf[4..32].copy_from_slice(&self.name);
        buf[32..60].copy_from_slice(&self.address);
        buf[60..64].copy_from_slice(&self.age.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        let mut name = [0u8; 28];
        let mut address = [0u8; 28];
        name.copy_from_slice(&buf[4..32]);
        address.copy_from_slice(&buf[32..60]);
        Self {
            id: i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            name,
            address,
            age: i32::from_le_bytes([buf[60], buf[61], buf[62], buf[63]]),
        }
    }
}

/// Projection of a [`TestRecord`] down to its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AgeOnly {
    pub age: i32,
}

impl AgeOnly {
    pub fn of(record: &TestRecord) -> Self {
        Self { age: record.age }
    }
}

impl Record for AgeOnly {
    const SIZE: usize = 4;

    fn encode(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.age.to_le_bytes());
    }

    fn decode(buf: &[u8]) -> Self {
        Self {
            age: i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        }
    }
}

/// Ten distinct records; ages 25 through 34 in insertion order.
pub(crate) fn sample_records() -> Vec<TestRecord> {
    vec![
        TestRecord::new(1, "John", "123 Main St.", 25),
        TestRecord::new(2, "Jane", "456 Main St.", 26),
        TestRecord::new(3, "Joe", "789 Main St.", 27),
        TestRecord::new(4, "Jack", "1011 Main St.", 28),
        TestRecord::new(5, "Jill", "1213 Main St.", 29),
        TestRecord::new(6, "Jim", "1415 Main St.", 30),
        TestRecord::new(7, "Jenny", "1617 Main St.", 31),
        TestRecord::new(8, "Janet", "1819 Main St.", 32),
        TestRecord::new(9, "Jerry", "1920 Main St.", 33),
        TestRecord::new(10, "Jared", "1921 Main St.", 34),
    ]
}
