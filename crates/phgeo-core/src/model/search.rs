// crates/phgeo-core/src/model/search.rs
use super::flat::GeoDb;
use super::hierarchy::{BarangayView, MunicipalityView, ProvinceView, RegionView};
use crate::common::DbStats;
use crate::schema::EntityKind;
use crate::text::NameMatch;
use std::fmt;

/// A hit from [`GeoDb::lookup`] or [`GeoDb::search`], at whichever level it
/// was found.
#[derive(Clone, Copy, PartialEq)]
pub enum GeoItem<'a> {
    Region(RegionView<'a>),
    Province(ProvinceView<'a>),
    Municipality(MunicipalityView<'a>),
    Barangay(BarangayView<'a>),
}

impl GeoItem<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            GeoItem::Region(_) => EntityKind::Region,
            GeoItem::Province(_) => EntityKind::Province,
            GeoItem::Municipality(_) => EntityKind::Municipality,
            GeoItem::Barangay(_) => EntityKind::Barangay,
        }
    }

    /// Display form of the record.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeoItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoItem::Region(v) => fmt::Display::fmt(v, f),
            GeoItem::Province(v) => fmt::Display::fmt(v, f),
            GeoItem::Municipality(v) => fmt::Display::fmt(v, f),
            GeoItem::Barangay(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl fmt::Debug for GeoItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoItem::Region(v) => fmt::Debug::fmt(v, f),
            GeoItem::Province(v) => fmt::Debug::fmt(v, f),
            GeoItem::Municipality(v) => fmt::Debug::fmt(v, f),
            GeoItem::Barangay(v) => fmt::Debug::fmt(v, f),
        }
    }
}

impl GeoDb {
    pub fn stats(&self) -> DbStats {
        DbStats {
            regions: self.regions.len(),
            provinces: self.provinces.len(),
            municipalities: self.municipalities.len(),
            barangays: self.barangays.len(),
        }
    }

    pub fn find_region_by_code(&self, code: &str) -> Option<RegionView<'_>> {
        self.regions
            .find_by_code(code.trim())
            .map(|r| self.view_region(r))
    }

    pub fn find_province_by_code(&self, code: &str) -> Option<ProvinceView<'_>> {
        self.provinces
            .find_by_code(code.trim())
            .map(|p| self.view_province(p))
    }

    pub fn find_municipality_by_code(&self, code: &str) -> Option<MunicipalityView<'_>> {
        self.municipalities
            .find_by_code(code.trim())
            .map(|m| self.view_municipality(m))
    }

    pub fn find_barangay_by_code(&self, code: &str) -> Option<BarangayView<'_>> {
        self.barangays
            .find_by_code(code.trim())
            .map(|b| self.view_barangay(b))
    }

    /// Finds `code` at any level, top down.
    pub fn lookup(&self, code: &str) -> Option<GeoItem<'_>> {
        self.find_region_by_code(code)
            .map(GeoItem::Region)
            .or_else(|| self.find_province_by_code(code).map(GeoItem::Province))
            .or_else(|| {
                self.find_municipality_by_code(code)
                    .map(GeoItem::Municipality)
            })
            .or_else(|| self.find_barangay_by_code(code).map(GeoItem::Barangay))
    }

    /// Accent- and case-insensitive name substring search over every level,
    /// regions first.
    pub fn search(&self, query: &str) -> Vec<GeoItem<'_>> {
        let mut out = Vec::new();
        out.extend(
            self.regions()
                .filter(|r| r.record().name_contains(query))
                .map(GeoItem::Region),
        );
        out.extend(
            self.provinces()
                .filter(|p| p.record().name_contains(query))
                .map(GeoItem::Province),
        );
        out.extend(
            self.municipalities()
                .filter(|m| m.record().name_contains(query))
                .map(GeoItem::Municipality),
        );
        out.extend(
            self.barangays()
                .filter(|b| b.record().name_contains(query))
                .map(GeoItem::Barangay),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choices::IslandGroup;
    use crate::model::{Barangay, Municipality, Province, Region};

    fn seeded() -> GeoDb {
        let mut db = GeoDb::default();
        let r = db
            .insert_region(Region::new("130000000", "NCR", IslandGroup::Luzon))
            .unwrap();
        let p = db
            .insert_province(Province::new("137400000", "Metro Manila", r))
            .unwrap();
        let m = db
            .insert_municipality(Municipality::new("137404000", "Quezon City", p, true, false))
            .unwrap();
        db.insert_barangay(Barangay::new("137404056", "Doña Imelda", m, Some(true)))
            .unwrap();
        db
    }

    #[test]
    fn lookup_finds_any_level() {
        let db = seeded();
        assert_eq!(db.lookup("137404000").unwrap().kind(), EntityKind::Municipality);
        assert_eq!(db.lookup(" 130000000 ").unwrap().label(), "NCR");
        assert!(db.lookup("999").is_none());
    }

    #[test]
    fn code_lookup_ignores_ascii_case() {
        let mut db = GeoDb::default();
        db.insert_region(Region::new("NCR", "National Capital Region", IslandGroup::Luzon))
            .unwrap();
        assert!(db.find_region_by_code("ncr").is_some());
    }

    #[test]
    fn search_folds_accents() {
        let db = seeded();
        let hits = db.search("dona");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind(), EntityKind::Barangay);
        assert!(db.search("").is_empty());
    }

    #[test]
    fn stats_count_every_level() {
        let stats = seeded().stats();
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.barangays, 1);
    }
}
