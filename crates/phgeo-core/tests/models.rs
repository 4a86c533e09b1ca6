use phgeo_core::prelude::*;
use phgeo_core::DeleteSummary;

const BARANGAY_NAME: &str = "DOÑA IMELDA";
const MUNICIPALITY_NAME: &str = "QUEZON CITY";
const PROVINCE_NAME: &str = "METRO MANILA";
const REGION_NAME: &str = "NATIONAL CAPITAL REGION (NCR)";

fn bundled() -> GeoDb {
    GeoDb::load_fixtures(&FixtureConfig::default()).expect("bundled fixtures load")
}

fn repr_output(code: &str, model: &str, name: &str) -> String {
    format!("<Code: {code}, {model}: {name}>")
}

#[test]
fn str_is_the_name() {
    let db = bundled();
    assert_eq!(db.find_region_by_code("130000000").unwrap().to_string(), REGION_NAME);
    assert_eq!(db.find_province_by_code("137400000").unwrap().to_string(), PROVINCE_NAME);
    assert_eq!(
        db.find_municipality_by_code("137404000").unwrap().to_string(),
        MUNICIPALITY_NAME
    );
    assert_eq!(db.find_barangay_by_code("137404056").unwrap().to_string(), BARANGAY_NAME);
}

#[test]
fn repr_carries_code_model_and_name() {
    let db = bundled();
    let barangay = db.find_barangay_by_code("137404056").unwrap();
    assert_eq!(
        format!("{barangay:?}"),
        repr_output("137404056", "Barangay", BARANGAY_NAME)
    );
    let region = db.find_region_by_code("130000000").unwrap();
    assert_eq!(region.repr(), repr_output("130000000", "Region", REGION_NAME));
}

#[test]
fn field_lists_match_the_declared_models() {
    let reg = SchemaRegistry::standard();
    assert_eq!(
        reg.field_names(EntityKind::Region),
        ["code", "id", "is_active", "island_group", "name", "population", "province"]
    );
    assert_eq!(
        reg.field_names(EntityKind::Province),
        ["code", "id", "income_class", "is_active", "municipality", "name", "population", "region"]
    );
    assert_eq!(
        reg.field_names(EntityKind::Municipality),
        [
            "barangays", "city_class", "code", "id", "income_class", "is_active", "is_capital",
            "is_city", "name", "population", "province"
        ]
    );
    assert_eq!(
        reg.field_names(EntityKind::Barangay),
        ["code", "id", "is_active", "is_urban", "municipality", "name", "population"]
    );
}

#[test]
fn choice_tables_keep_declaration_order() {
    assert_eq!(
        IslandGroup::CHOICES,
        [("L", "LUZON"), ("V", "VISAYAS"), ("M", "MINDANAO")]
    );
    assert_eq!(
        IncomeClass::CHOICES,
        [
            ("1", "1ST"),
            ("2", "2ND"),
            ("3", "3RD"),
            ("4", "4TH"),
            ("5", "5TH"),
            ("6", "6TH"),
            ("S", "SPECIAL")
        ]
    );
    assert_eq!(CityClass::CHOICES, [("C", "CC"), ("I", "ICC"), ("H", "HUC")]);
}

#[test]
fn reverse_relations_are_populated() {
    let db = bundled();
    let region = db.find_region_by_code("130000000").unwrap();
    assert!(!region.provinces().is_empty());
    let province = db.find_province_by_code("137400000").unwrap();
    assert!(!province.municipalities().is_empty());
    let municipality = db.find_municipality_by_code("137404000").unwrap();
    assert_eq!(municipality.barangays().len(), 2);
}

#[test]
fn derived_ancestors_resolve() {
    let db = bundled();
    let region = db.find_region_by_code("130000000").unwrap();
    let province = db.find_province_by_code("137400000").unwrap();
    let municipality = db.find_municipality_by_code("137404000").unwrap();
    let barangay = db.find_barangay_by_code("137404056").unwrap();

    assert_eq!(province.island_group(), Some(region.island_group));
    assert_eq!(municipality.region(), Some(region));
    assert_eq!(municipality.island_group(), Some(IslandGroup::Luzon));
    assert_eq!(barangay.province(), Some(province));
    assert_eq!(barangay.region(), Some(region));
    assert_eq!(barangay.island_group(), Some(region.island_group));
}

#[test]
fn deleting_a_region_cascades_to_every_level() {
    let mut db = bundled();
    let id = db.find_region_by_code("070000000").unwrap().id;
    let summary = db.delete_region(id).unwrap();
    assert_eq!(
        summary,
        DeleteSummary {
            regions: 1,
            provinces: 1,
            municipalities: 2,
            barangays: 3,
        }
    );
    assert!(db.find_barangay_by_code("072217001").is_none());
    assert!(db.find_barangay_by_code("137404056").is_some());
}
