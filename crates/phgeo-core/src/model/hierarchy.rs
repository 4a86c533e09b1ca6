// crates/phgeo-core/src/model/hierarchy.rs
//! Borrowed views pairing a record with the store it lives in.
//!
//! Records only hold their direct parent's id. Everything further up the
//! chain (a barangay's province, region and island group) is derived on
//! demand through these views. A broken link anywhere on the chain, whether
//! a missing parent row or a relation no longer declared by the applied
//! schema, reads as `None`.
use super::flat::GeoDb;
use super::records::{
    Barangay, BarangayId, Geography, Municipality, MunicipalityId, Province, ProvinceId, Region,
    RegionId,
};
use crate::choices::IslandGroup;
use std::fmt;
use std::ops::Deref;

macro_rules! view {
    ($(#[$doc:meta])* $view:ident => $record:ty) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $view<'a> {
            db: &'a GeoDb,
            record: &'a $record,
        }

        impl<'a> $view<'a> {
            pub fn record(&self) -> &'a $record {
                self.record
            }
        }

        impl Deref for $view<'_> {
            type Target = $record;

            fn deref(&self) -> &Self::Target {
                self.record
            }
        }

        impl PartialEq for $view<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.record == other.record
            }
        }

        impl fmt::Debug for $view<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self.record, f)
            }
        }

        impl fmt::Display for $view<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self.record, f)
            }
        }
    };
}

view!(
    /// A region together with its store.
    RegionView => Region
);
view!(
    /// A province together with its store.
    ProvinceView => Province
);
view!(
    /// A municipality together with its store.
    MunicipalityView => Municipality
);
view!(
    /// A barangay together with its store.
    BarangayView => Barangay
);

impl<'a> RegionView<'a> {
    pub fn provinces(&self) -> Vec<ProvinceView<'a>> {
        let db = self.db;
        if !db.relation_declared::<Province>() {
            return Vec::new();
        }
        db.provinces
            .iter()
            .filter(|p| p.region == self.record.id)
            .map(|p| db.view_province(p))
            .collect()
    }
}

impl<'a> ProvinceView<'a> {
    pub fn region(&self) -> Option<RegionView<'a>> {
        self.db.parent_of(self.record)?;
        self.db.region(self.record.region)
    }

    pub fn island_group(&self) -> Option<IslandGroup> {
        self.region().map(|r| r.island_group)
    }

    pub fn municipalities(&self) -> Vec<MunicipalityView<'a>> {
        let db = self.db;
        if !db.relation_declared::<Municipality>() {
            return Vec::new();
        }
        db.municipalities
            .iter()
            .filter(|m| m.province == self.record.id)
            .map(|m| db.view_municipality(m))
            .collect()
    }
}

impl<'a> MunicipalityView<'a> {
    pub fn province(&self) -> Option<ProvinceView<'a>> {
        self.db.parent_of(self.record)?;
        self.db.province(self.record.province)
    }

    /// The province's region.
    pub fn region(&self) -> Option<RegionView<'a>> {
        self.province()?.region()
    }

    pub fn island_group(&self) -> Option<IslandGroup> {
        self.province()?.island_group()
    }

    pub fn barangays(&self) -> Vec<BarangayView<'a>> {
        let db = self.db;
        if !db.relation_declared::<Barangay>() {
            return Vec::new();
        }
        db.barangays
            .iter()
            .filter(|b| b.municipality == self.record.id)
            .map(|b| db.view_barangay(b))
            .collect()
    }
}

impl<'a> BarangayView<'a> {
    pub fn municipality(&self) -> Option<MunicipalityView<'a>> {
        self.db.parent_of(self.record)?;
        self.db.municipality(self.record.municipality)
    }

    pub fn province(&self) -> Option<ProvinceView<'a>> {
        self.municipality()?.province()
    }

    pub fn region(&self) -> Option<RegionView<'a>> {
        self.municipality()?.region()
    }

    pub fn island_group(&self) -> Option<IslandGroup> {
        self.municipality()?.island_group()
    }
}

impl GeoDb {
    pub fn region(&self, id: RegionId) -> Option<RegionView<'_>> {
        self.regions.get(id.0).map(|r| self.view_region(r))
    }

    pub fn province(&self, id: ProvinceId) -> Option<ProvinceView<'_>> {
        self.provinces.get(id.0).map(|p| self.view_province(p))
    }

    pub fn municipality(&self, id: MunicipalityId) -> Option<MunicipalityView<'_>> {
        self.municipalities
            .get(id.0)
            .map(|m| self.view_municipality(m))
    }

    pub fn barangay(&self, id: BarangayId) -> Option<BarangayView<'_>> {
        self.barangays.get(id.0).map(|b| self.view_barangay(b))
    }

    /// Views `record` against this store. The record need not be stored;
    /// its parent links resolve the same way.
    pub fn view_region<'a>(&'a self, record: &'a Region) -> RegionView<'a> {
        RegionView { db: self, record }
    }

    pub fn view_province<'a>(&'a self, record: &'a Province) -> ProvinceView<'a> {
        ProvinceView { db: self, record }
    }

    pub fn view_municipality<'a>(&'a self, record: &'a Municipality) -> MunicipalityView<'a> {
        MunicipalityView { db: self, record }
    }

    pub fn view_barangay<'a>(&'a self, record: &'a Barangay) -> BarangayView<'a> {
        BarangayView { db: self, record }
    }

    /// All regions in id order.
    pub fn regions(&self) -> impl Iterator<Item = RegionView<'_>> {
        self.regions.iter().map(move |r| self.view_region(r))
    }

    pub fn provinces(&self) -> impl Iterator<Item = ProvinceView<'_>> {
        self.provinces.iter().map(move |p| self.view_province(p))
    }

    pub fn municipalities(&self) -> impl Iterator<Item = MunicipalityView<'_>> {
        self.municipalities
            .iter()
            .map(move |m| self.view_municipality(m))
    }

    pub fn barangays(&self) -> impl Iterator<Item = BarangayView<'_>> {
        self.barangays.iter().map(move |b| self.view_barangay(b))
    }

    /// Whether `T`'s relation to its parent is still part of the applied schema.
    fn relation_declared<T: Geography>(&self) -> bool {
        let Some(shape) = self.schema().model(T::KIND) else {
            return false;
        };
        match T::KIND.parent() {
            Some(parent) => shape.has_field(parent.model_name()),
            None => false,
        }
    }

    fn parent_of<T: Geography>(&self, record: &T) -> Option<u32> {
        if !self.relation_declared::<T>() {
            return None;
        }
        record.parent().map(|(_, pk)| pk)
    }
}
