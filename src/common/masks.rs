// src/common/masks.rs

// Máscaras de exibição. O banco guarda telefone e CNPJ apenas com dígitos;
// a formatação é aplicada na leitura e removida na escrita.

const PHONE_MAX_DIGITS: usize = 11;
const CNPJ_DIGITS: usize = 14;

/// Remove tudo que não for dígito ASCII.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Aplica a máscara de telefone brasileiro.
///
/// Até 10 dígitos vira `(DD) DDDD-DDDD`, com 11 vira `(DD) DDDDD-DDDD`.
/// Entradas parciais recebem a máscara até onde há dígitos, e qualquer
/// excedente além de 11 dígitos é descartado.
pub fn format_phone(value: &str) -> String {
    let mut digits = digits_only(value);
    digits.truncate(PHONE_MAX_DIGITS);

    if digits.len() < 3 {
        return digits;
    }

    let (area_code, number) = digits.split_at(2);
    let split = if digits.len() <= 10 { 4 } else { 5 };

    if number.len() > split {
        let (prefix, suffix) = number.split_at(split);
        format!("({}) {}-{}", area_code, prefix, suffix)
    } else {
        format!("({}) {}", area_code, number)
    }
}

/// Aplica a máscara de CNPJ `NN.NNN.NNN/NNNN-NN`.
pub fn format_cnpj(value: &str) -> String {
    let mut digits = digits_only(value);
    digits.truncate(CNPJ_DIGITS);

    let mut masked = String::with_capacity(18);
    for (index, digit) in digits.chars().enumerate() {
        match index {
            2 | 5 => masked.push('.'),
            8 => masked.push('/'),
            12 => masked.push('-'),
            _ => {}
        }
        masked.push(digit);
    }
    masked
}

/// DDD + número: no mínimo 10 dígitos.
pub fn is_valid_phone(value: &str) -> bool {
    let len = digits_only(value).len();
    (10..=PHONE_MAX_DIGITS).contains(&len)
}

pub const BRAZILIAN_STATES: [&str; 27] = [
    "Acre",
    "Alagoas",
    "Amapá",
    "Amazonas",
    "Bahia",
    "Ceará",
    "Distrito Federal",
    "Espírito Santo",
    "Goiás",
    "Maranhão",
    "Mato Grosso",
    "Mato Grosso do Sul",
    "Minas Gerais",
    "Pará",
    "Paraíba",
    "Paraná",
    "Pernambuco",
    "Piauí",
    "Rio de Janeiro",
    "Rio Grande do Norte",
    "Rio Grande do Sul",
    "Rondônia",
    "Roraima",
    "Santa Catarina",
    "São Paulo",
    "Sergipe",
    "Tocantins",
];
