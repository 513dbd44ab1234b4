use core::mem::size_of;
use core::str::from_utf8;

use crate::base::iters::DevTreeReserveEntryIter;
use crate::base::parse::{next_token, ParsedTok};
use crate::error::DevTreeError;
use crate::priv_util::SliceRead;
use crate::spec::{fdt_header, FDT_MAGIC};

use alloc::vec::Vec;

macro_rules! get_be32_field {
    ( $f:ident, $s:ident , $buf:expr ) => {
        $buf.read_be_u32(offset_of!($s, $f))
    };
}

/// A parseable Flattened Device Tree.
///
/// This parser was written according to the v0.3 specification provided at
/// https://www.devicetree.org/
///
/// Construction validates the header and the region layout; the accessors
/// below are infallible afterwards.
#[derive(Copy, Clone, Debug)]
pub struct DevTree<'a> {
    buf: &'a [u8],
}

impl<'a> DevTree<'a> {
    pub const MIN_HEADER_SIZE: usize = size_of::<fdt_header>();

    /// Verify the magic header of a Device Tree buffer.
    #[inline]
    pub fn verify_magic(buf: &[u8]) -> Result<(), DevTreeError> {
        if get_be32_field!(magic, fdt_header, buf)? != FDT_MAGIC {
            Err(DevTreeError::InvalidMagicNumber)
        } else {
            Ok(())
        }
    }

    /// Using the provided byte slice this method will:
    ///
    /// 1. Verify that the slice begins with the magic Device Tree header
    /// 2. Return the reported `totalsize` field of the Device Tree header
    ///
    /// When one must parse a Flattened Device Tree, it's possible that the
    /// actual size of the device tree may be unknown. For that reason, this
    /// method can be called before constructing the [`DevTree`].
    #[inline]
    pub fn read_totalsize(buf: &[u8]) -> Result<usize, DevTreeError> {
        Self::verify_magic(buf)?;
        Ok(get_be32_field!(totalsize, fdt_header, buf)? as usize)
    }

    /// Construct the parseable DevTree object from the provided byte slice.
    ///
    /// The buffer must hold the whole tree; trailing bytes past `totalsize`
    /// are ignored. Fails with [`DevTreeError::InconsistentLayout`] if the
    /// header's offsets and sizes do not carve the buffer into
    /// header/reservation/structure/strings regions.
    pub fn new(buf: &'a [u8]) -> Result<Self, DevTreeError> {
        let totalsize = Self::read_totalsize(buf)?;
        if totalsize > buf.len() || totalsize < Self::MIN_HEADER_SIZE {
            return Err(DevTreeError::InconsistentLayout);
        }

        let ret = Self { buf };
        ret.verify_layout()?;
        debug!(
            "parsed FDT header: totalsize={:#x} version={} struct={:#x}+{:#x} strings={:#x}+{:#x}",
            ret.totalsize(),
            ret.version(),
            ret.off_dt_struct(),
            ret.size_dt_struct(),
            ret.off_dt_strings(),
            ret.size_dt_strings(),
        );
        Ok(ret)
    }

    fn verify_layout(&self) -> Result<(), DevTreeError> {
        let totalsize = self.totalsize();

        let struct_end = self
            .off_dt_struct()
            .checked_add(self.size_dt_struct())
            .ok_or(DevTreeError::InconsistentLayout)?;
        let strings_end = self
            .off_dt_strings()
            .checked_add(self.size_dt_strings())
            .ok_or(DevTreeError::InconsistentLayout)?;
        if struct_end > totalsize || strings_end > totalsize {
            return Err(DevTreeError::InconsistentLayout);
        }

        // The reservation block has no explicit size; it owns whatever the
        // other regions do not. A negative remainder means the header lies.
        let rsv_size = totalsize
            .checked_sub(self.size_dt_struct())
            .and_then(|s| s.checked_sub(self.size_dt_strings()))
            .and_then(|s| s.checked_sub(Self::MIN_HEADER_SIZE))
            .ok_or(DevTreeError::InconsistentLayout)?;
        let rsv_end = self
            .off_mem_rsvmap()
            .checked_add(rsv_size)
            .ok_or(DevTreeError::InconsistentLayout)?;
        if rsv_end > totalsize {
            return Err(DevTreeError::InconsistentLayout);
        }

        // Token records are u32-aligned by construction.
        if self.off_dt_struct() % size_of::<u32>() != 0
            || self.off_mem_rsvmap() % size_of::<u32>() != 0
        {
            return Err(DevTreeError::ParseError);
        }
        Ok(())
    }

    /// Returns the totalsize field of the Device Tree.
    #[inline]
    #[must_use]
    pub fn totalsize(&self) -> usize {
        // Infallible: `new` checked the buffer covers the whole header.
        get_be32_field!(totalsize, fdt_header, self.buf).unwrap() as usize
    }

    /// Returns the rsvmap offset field of the Device Tree.
    #[inline]
    #[must_use]
    pub fn off_mem_rsvmap(&self) -> usize {
        get_be32_field!(off_mem_rsvmap, fdt_header, self.buf).unwrap() as usize
    }

    /// Returns the dt_struct offset field of the Device Tree.
    #[inline]
    #[must_use]
    pub fn off_dt_struct(&self) -> usize {
        get_be32_field!(off_dt_struct, fdt_header, self.buf).unwrap() as usize
    }

    #[inline]
    #[must_use]
    pub fn size_dt_struct(&self) -> usize {
        get_be32_field!(size_dt_struct, fdt_header, self.buf).unwrap() as usize
    }

    /// Returns the dt_strings offset field of the Device Tree.
    #[inline]
    #[must_use]
    pub fn off_dt_strings(&self) -> usize {
        get_be32_field!(off_dt_strings, fdt_header, self.buf).unwrap() as usize
    }

    #[inline]
    #[must_use]
    pub fn size_dt_strings(&self) -> usize {
        get_be32_field!(size_dt_strings, fdt_header, self.buf).unwrap() as usize
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        get_be32_field!(version, fdt_header, self.buf).unwrap()
    }

    #[inline]
    #[must_use]
    pub fn last_comp_version(&self) -> u32 {
        get_be32_field!(last_comp_version, fdt_header, self.buf).unwrap()
    }

    #[inline]
    #[must_use]
    pub fn boot_cpuid_phys(&self) -> u32 {
        get_be32_field!(boot_cpuid_phys, fdt_header, self.buf).unwrap()
    }

    /// Derived byte length of the memory reservation block.
    #[inline]
    #[must_use]
    pub fn rsv_region_size(&self) -> usize {
        self.totalsize() - self.size_dt_struct() - self.size_dt_strings() - Self::MIN_HEADER_SIZE
    }

    /// The structure block as a slice. Token offsets are relative to it.
    #[inline]
    #[must_use]
    pub fn struct_region(&self) -> &'a [u8] {
        // Region bounds were checked in `new`.
        &self.buf[self.off_dt_struct()..self.off_dt_struct() + self.size_dt_struct()]
    }

    /// The strings block as a slice. Property name offsets resolve into it.
    #[inline]
    #[must_use]
    pub fn strings_region(&self) -> &'a [u8] {
        &self.buf[self.off_dt_strings()..self.off_dt_strings() + self.size_dt_strings()]
    }

    /// Resolve a property name offset against the strings block.
    pub fn string_at(&self, offset: usize) -> Result<&'a str, DevTreeError> {
        let bytes = self.strings_region().read_bstring0(offset)?;
        Ok(from_utf8(bytes)?)
    }

    /// Collect the structure block's token records.
    ///
    /// Parsing stops at the first end-of-stream token; anything after it is
    /// left unread.
    pub fn tokens(&self) -> Result<Vec<ParsedTok<'a>>, DevTreeError> {
        let region = self.struct_region();
        let mut toks = Vec::new();
        let mut off = 0;
        while let Some(tok) = next_token(region, &mut off)? {
            toks.push(tok);
        }
        Ok(toks)
    }

    /// Returns an iterator over the Dev Tree "5.3 Memory Reservation Blocks".
    #[inline]
    #[must_use]
    pub fn reserved_entries(&self) -> DevTreeReserveEntryIter<'_, 'a> {
        DevTreeReserveEntryIter::new(self)
    }

    #[inline]
    #[must_use]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }
}
