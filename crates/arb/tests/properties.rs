//! Property tests over the public API.

use arb::prelude::*;
use arb::types::ident;
use arb_test_utils::strategies::{arb_cmd, arb_data, identifier, invalid_identifier};
use proptest::prelude::*;

proptest! {
    #[test]
    fn objects_keep_their_kind_through_the_store(data in arb_data(), cmd in arb_cmd()) {
        let mut store = ArbStore::new();
        for object in [ArbObject::from(data), ArbObject::from(cmd)] {
            let h = object.to_raw(&mut store, None).unwrap();
            prop_assert_eq!(store.handle_kind(h).unwrap(), object.kind());
            prop_assert_eq!(ArbObject::from_raw(&store, h).unwrap(), object);
        }
    }

    #[test]
    fn data_view_of_a_command_is_its_payload(cmd in arb_cmd()) {
        let mut store = ArbStore::new();
        let h = ArbObject::from(cmd.clone()).to_raw(&mut store, None).unwrap();
        let view = ArbData::from_raw(&store, h).unwrap();
        prop_assert_eq!(&view, cmd.data());
        prop_assert_eq!(ArbObject::from_raw(&store, h).unwrap().into_data(), view);
    }

    #[test]
    fn valid_identifiers_build_commands(iface in identifier(), oper in identifier()) {
        let cmd = ArbCmd::new(iface.as_str(), oper.as_str()).unwrap();
        prop_assert_eq!(cmd.iface(), iface.as_str());
        prop_assert_eq!(cmd.oper_identifier(), &oper);
    }

    #[test]
    fn invalid_identifiers_never_build_commands(bad in invalid_identifier()) {
        prop_assert!(!ident::is_valid_identifier(&bad));
        let is_invalid_identifier = matches!(
            ArbCmd::new(&bad, "ok"),
            Err(ArbError::InvalidIdentifier { .. })
        );
        prop_assert!(is_invalid_identifier);
    }
}
