use detprep::ir::io_box_csv::{from_box_csv_str, to_box_csv_string};
use proptest::prelude::*;

mod proptest_helpers;
use proptest_helpers::{arb_csv_record, render_csv};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn alias_headers_parse_identically(
        records in proptest::collection::vec(arb_csv_record(), 0..16),
    ) {
        let canonical = from_box_csv_str(&render_csv("#item,x,y,width,height,label", &records))
            .expect("parse canonical");

        for header in [
            "#item,xc,yc,dx,dy,class",
            "#item,x_center,y_center,w,h,category_id",
            "#ITEM,X,Y,WIDTH,HEIGHT,LABEL",
        ] {
            let aliased = from_box_csv_str(&render_csv(header, &records)).expect("parse aliases");
            prop_assert_eq!(&aliased, &canonical, "header {}", header);
        }
    }

    #[test]
    fn grid_aligned_records_roundtrip_exactly(
        records in proptest::collection::vec(arb_csv_record(), 0..16),
    ) {
        let csv = to_box_csv_string(&records).expect("write csv");
        let restored = from_box_csv_str(&csv).expect("read csv");
        prop_assert_eq!(restored, records);
    }

    #[test]
    fn arbitrary_text_never_panics(input in "\\PC{0,256}") {
        let _ = from_box_csv_str(&input);
    }
}
