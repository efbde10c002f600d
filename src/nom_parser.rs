use nom::bytes::complete::{take, take_while_m_n};
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res, rest};
use nom::number::complete::be_u8;
use nom::sequence::tuple;
use nom::IResult;

type Char = u8;
type Buf = [u8];

/// Splits a checked reply message into echoed address, command echo and data.
pub(crate) fn reply(buf: &Buf) -> Option<(&Buf, Char, &Buf)> {
    let parsed: IResult<&Buf, _> = tuple((take(3usize), be_u8, rest))(buf);
    parsed.ok().map(|(_, fields)| fields)
}

/// An unsigned decimal integer spanning the whole data field.
pub(crate) fn int_field(buf: &Buf) -> Option<u32> {
    let parsed: IResult<&Buf, u32> = all_consuming(map_int(digit1))(buf);
    parsed.ok().map(|(_, n)| n)
}

/// The pressure data field: a four digit mantissa followed by the exponent,
/// offset by 20.
pub(crate) fn pressure_field(buf: &Buf) -> Option<(u16, i32)> {
    let mantissa = map_int(take_while_m_n(4, 4, |c: Char| c.is_ascii_digit()));
    let exponent = map_int(digit1);
    let parsed: IResult<&Buf, (u16, i32)> = all_consuming(tuple((mantissa, exponent)))(buf);
    parsed.ok().map(|(_, fields)| fields)
}

fn map_int<'a, O, F>(first: F) -> impl FnMut(&'a Buf) -> IResult<&'a Buf, O>
where
    F: FnMut(&'a Buf) -> IResult<&'a Buf, &'a Buf>,
    O: core::str::FromStr,
{
    let to_str = map_res(first, |u: &'a Buf| core::str::from_utf8(u));
    map_res(to_str, |s: &'a str| s.parse::<O>())
}
