use crate::form::FormId;

/// Element id for a bound field, stable for a given form and field name and
/// distinct across forms rendering fields with the same name.
pub fn field_element_id(form: FormId, name: &str) -> String {
    let seed = format!("form:{}:field:{name}", form.0);
    format!("calmform-field-{:016x}", fnv1a64(seed.as_bytes()))
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x00000100000001b3;

    let mut hash = OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_for_same_form_and_field() {
        let ids = (0..3)
            .map(|_| field_element_id(FormId(7), "email"))
            .collect::<Vec<_>>();
        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(ids[0].starts_with("calmform-field-"));
    }

    #[test]
    fn id_differs_across_forms_and_fields() {
        let base = field_element_id(FormId(1), "email");
        assert_ne!(base, field_element_id(FormId(2), "email"));
        assert_ne!(base, field_element_id(FormId(1), "password"));
    }

    #[test]
    fn fnv_matches_reference_vector() {
        assert_eq!(fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }
}
