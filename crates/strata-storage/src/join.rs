//! Block-nested-loop joins and cross-representation table comparison.
//!
//! Every function here is generic over [`RecordSource`], so the four
//! storage-location combinations (disk x disk, memory x memory, and the
//! two mixed forms) share one algorithm body. The outer loop is always
//! the first source: storage location changes I/O cost, never output
//! content or order.

use crate::disk::DiskTable;
use crate::memory::MemoryTable;
use crate::scan::RecordSource;
use strata_common::{Record, Result};

/// An output record type that knows how to pair its two input types.
///
/// Implementing this makes a record usable with the defaulted join
/// functions: `is_match` decides whether a pair joins, and `join` builds
/// the output record from it.
pub trait Joinable<A: Record, B: Record>: Record {
    /// Returns true if `a` and `b` should be paired.
    fn is_match(a: &A, b: &B) -> bool;

    /// Builds the output record from a matching pair.
    fn join(a: &A, b: &B) -> Self;
}

/// Joins `a` and `b` into a fresh temporary on-disk table using the
/// output type's own match predicate and constructor.
pub fn bnl_join_into_disk<A, B, O, SA, SB>(a: &SA, b: &SB) -> Result<DiskTable<O>>
where
    A: Record,
    B: Record,
    O: Joinable<A, B>,
    SA: RecordSource<A>,
    SB: RecordSource<B>,
{
    bnl_join_into_disk_by(a, b, O::is_match, O::join)
}

/// Joins `a` and `b` into a new in-memory table using the output type's
/// own match predicate and constructor.
pub fn bnl_join_into_memory<A, B, O, SA, SB>(a: &SA, b: &SB) -> Result<MemoryTable<O>>
where
    A: Record,
    B: Record,
    O: Joinable<A, B>,
    SA: RecordSource<A>,
    SB: RecordSource<B>,
{
    bnl_join_into_memory_by(a, b, O::is_match, O::join)
}

/// Joins `a` and `b` into a fresh temporary on-disk table.
///
/// Block nested loop: for every record of `a`, the whole of `b` is
/// scanned in its native order; each pair passing `filter` is mapped
/// through `map` and appended. O(|a| * |b|) predicate evaluations, no
/// hashing, no sorting, no indexes. Output order is a-major, b-minor.
pub fn bnl_join_into_disk_by<A, B, O, SA, SB, F, M>(
    a: &SA,
    b: &SB,
    mut filter: F,
    mut map: M,
) -> Result<DiskTable<O>>
where
    A: Record,
    B: Record,
    O: Record,
    SA: RecordSource<A>,
    SB: RecordSource<B>,
    F: FnMut(&A, &B) -> bool,
    M: FnMut(&A, &B) -> O,
{
    let mut out = DiskTable::create_temp()?;

    for row_a in a.scan_records() {
        let row_a = row_a?;
        for row_b in b.scan_records() {
            let row_b = row_b?;
            if filter(&row_a, &row_b) {
                out.insert(map(&row_a, &row_b))?;
            }
        }
    }

    Ok(out)
}

/// Joins `a` and `b` into a new in-memory table.
///
/// Same algorithm and ordering as [`bnl_join_into_disk_by`]; only the
/// output representation differs.
pub fn bnl_join_into_memory_by<A, B, O, SA, SB, F, M>(
    a: &SA,
    b: &SB,
    mut filter: F,
    mut map: M,
) -> Result<MemoryTable<O>>
where
    A: Record,
    B: Record,
    O: Record,
    SA: RecordSource<A>,
    SB: RecordSource<B>,
    F: FnMut(&A, &B) -> bool,
    M: FnMut(&A, &B) -> O,
{
    let mut out = MemoryTable::new();

    for row_a in a.scan_records() {
        let row_a = row_a?;
        for row_b in b.scan_records() {
            let row_b = row_b?;
            if filter(&row_a, &row_b) {
                out.insert(map(&row_a, &row_b));
            }
        }
    }

    Ok(out)
}

/// Returns true if two tables hold equal records in equal order.
///
/// Works across any mix of representations. The comparison is
/// order-sensitive: equal multisets in different sequences are unequal.
pub fn tables_equal<R, SA, SB>(a: &SA, b: &SB) -> Result<bool>
where
    R: Record + PartialEq,
    SA: RecordSource<R>,
    SB: RecordSource<R>,
{
    if a.record_count()? != b.record_count()? {
        return Ok(false);
    }

    let mut rows_a = a.scan_records();
    let mut rows_b = b.scan_records();

    loop {
        match (rows_a.next(), rows_b.next()) {
            (Some(row_a), Some(row_b)) => {
                if row_a? != row_b? {
                    return Ok(false);
                }
            }
            (None, None) => return Ok(true),
            _ => return Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_records, TestRecord};
    use strata_common::{Record, Result};
    use tempfile::tempdir;

    /// Pairing of two people living at the same address.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Housemates {
        resident_a: i32,
        resident_b: i32,
    }

    impl Record for Housemates {
        const SIZE: usize = 8;

        fn encode(&self, buf: &mut [u8]) {
            buf[0..4].copy_from_slice(&self.resident_a.to_le_bytes());
            buf[4..8].copy_from_slice(&self.resident_b.to_le_bytes());
        }

        fn decode(buf: &[u8]) -> Self {
            Self {
                resident_a: i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
                resident_b: i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            }
        }
    }

    impl Joinable<TestRecord, TestRecord> for Housemates {
        fn is_match(a: &TestRecord, b: &TestRecord) -> bool {
            a.address == b.address && a.id != b.id
        }

        fn join(a: &TestRecord, b: &TestRecord) -> Self {
            Self {
                resident_a: a.id,
                resident_b: b.id,
            }
        }
    }

    #[test]
    fn test_join_into_memory_by_closures() {
        let people = MemoryTable::from(sample_records());

        let pairs = bnl_join_into_memory_by(
            &people,
            &people,
            |a: &TestRecord, b: &TestRecord| a.age + 1 == b.age,
            |a, b| Housemates {
                resident_a: a.id,
                resident_b: b.id,
            },
        )
        .unwrap();

        // Ages are consecutive, so each record pairs with its successor.
        assert_eq!(pairs.size(), 9);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.resident_a as usize, i + 1);
            assert_eq!(pair.resident_b as usize, i + 2);
        }
    }

    #[test]
    fn test_join_with_default_predicates() {
        let mut records = sample_records();
        records.push(TestRecord::new(11, "Jess", "123 Main St.", 21));
        let people = MemoryTable::from(records);

        let pairs: MemoryTable<Housemates> =
            bnl_join_into_memory(&people, &people).unwrap();

        // Records 1 and 11 share an address, in both orientations.
        assert_eq!(pairs.size(), 2);
        assert_eq!(
            pairs.read(0).unwrap(),
            Housemates {
                resident_a: 1,
                resident_b: 11
            }
        );
        assert_eq!(
            pairs.read(1).unwrap(),
            Housemates {
                resident_a: 11,
                resident_b: 1
            }
        );
    }

    #[test]
    fn test_join_into_disk_matches_memory_output() {
        let dir = tempdir().unwrap();
        let people_mem = MemoryTable::from(sample_records());
        let mut people_disk = DiskTable::open(dir.path().join("people")).unwrap();
        for record in sample_records() {
            people_disk.insert(record).unwrap();
        }

        let from_memory: MemoryTable<Housemates> =
            bnl_join_into_memory(&people_mem, &people_mem).unwrap();
        let from_disk: DiskTable<Housemates> =
            bnl_join_into_disk(&people_disk, &people_disk).unwrap();

        assert!(from_disk.is_temp());
        assert!(tables_equal(&from_memory, &from_disk).unwrap());
    }

    #[test]
    fn test_join_with_no_matches_is_empty() {
        let people = MemoryTable::from(sample_records());
        let pairs = bnl_join_into_memory_by(
            &people,
            &people,
            |_: &TestRecord, _: &TestRecord| false,
            Housemates::join,
        )
        .unwrap();
        assert_eq!(pairs.size(), 0);
    }

    #[test]
    fn test_tables_equal_across_representations() {
        let dir = tempdir().unwrap();
        let memory = MemoryTable::from(sample_records());
        let mut disk = DiskTable::open(dir.path().join("people")).unwrap();
        for record in sample_records() {
            disk.insert(record).unwrap();
        }

        assert!(tables_equal(&memory, &disk).unwrap());
        assert!(tables_equal(&disk, &memory).unwrap());
        assert!(tables_equal(&disk, &disk).unwrap());
        assert!(tables_equal(&memory, &memory).unwrap());
    }

    #[test]
    fn test_tables_equal_detects_extra_record() {
        let dir = tempdir().unwrap();
        let memory = MemoryTable::from(sample_records());
        let mut disk = DiskTable::open(dir.path().join("people")).unwrap();
        for record in sample_records() {
            disk.insert(record).unwrap();
        }
        disk.insert(TestRecord::new(11, "Josh", "2022 Main St.", 35))
            .unwrap();

        assert!(!tables_equal(&memory, &disk).unwrap());
        assert!(!tables_equal(&disk, &memory).unwrap());
    }

    #[test]
    fn test_tables_equal_is_order_sensitive() {
        let mut reordered = sample_records();
        reordered.swap(3, 7);

        let a = MemoryTable::from(sample_records());
        let b = MemoryTable::from(reordered);
        assert!(!tables_equal(&a, &b).unwrap());
    }

    #[test]
    fn test_join_propagates_scan_errors() {
        let dir = tempdir().unwrap();
        let mut corrupt = DiskTable::open(dir.path().join("people")).unwrap();
        for record in sample_records() {
            corrupt.insert(record).unwrap();
        }
        corrupt.flush_write_buffer().unwrap();
        corrupt.rows.append(&[0x00; 5]).unwrap();

        let other = MemoryTable::from(sample_records());
        let result: Result<MemoryTable<Housemates>> =
            bnl_join_into_memory(&corrupt, &other);
        assert!(result.is_err());
    }
}
